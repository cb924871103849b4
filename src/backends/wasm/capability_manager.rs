// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WASM engine configuration and capability management
//!
//! A fragment module runs with exactly one capability: the nested-loader
//! primitive `soulbind.require`. This module creates the engine fragments are
//! compiled with, builds the linker that offers that single import, and
//! rejects modules that ask for anything else.

use crate::backends::wasm::error::{WasmError, WasmResult};
use crate::traits::Require;
use wasmtime::*;

/// Import module name offered to fragments.
pub const HOST_MODULE: &str = "soulbind";
/// `require(path_ptr, path_len, ctx_ptr, ctx_len, out_len_ptr) -> ptr`
pub const REQUIRE_FUNCTION: &str = "require";

/// Exports every fragment module must provide.
pub const REQUIRED_FUNCTION_EXPORTS: &[&str] = &["allocate", "deallocate", "render"];

/// Per-instance host state.
pub struct FragmentHost {
    pub require: Require,
}

/// Creates a Wasmtime engine for core-module fragments.
///
/// **All engines:**
/// - `wasm_component_model(false)` - fragments are core modules
/// - `consume_fuel(true)` - every render runs on a fuel budget
/// - Disabled features: threads, SIMD, multi-memory, memory64
pub fn create_engine() -> WasmResult<Engine> {
    let mut config = Config::new();

    config.wasm_component_model(false);
    config.wasm_threads(false);
    config.wasm_simd(false);
    config.wasm_relaxed_simd(false);
    config.wasm_multi_memory(false);
    config.wasm_memory64(false);
    config.consume_fuel(true);
    config.epoch_interruption(false);

    Engine::new(&config).map_err(|e| WasmError::EngineError(e.to_string()))
}

/// Rejects modules importing anything but `soulbind.require`.
pub fn validate_imports(module: &Module) -> WasmResult<()> {
    for import in module.imports() {
        let allowed = import.module() == HOST_MODULE
            && import.name() == REQUIRE_FUNCTION
            && matches!(import.ty(), ExternType::Func(_));
        if !allowed {
            return Err(WasmError::ForbiddenImport {
                module: import.module().to_string(),
                name: import.name().to_string(),
            });
        }
    }
    Ok(())
}

/// Checks the fragment ABI exports are present.
pub fn validate_exports(module: &Module) -> WasmResult<()> {
    if !matches!(module.get_export("memory"), Some(ExternType::Memory(_))) {
        return Err(WasmError::MissingExport("memory".to_string()));
    }
    for name in REQUIRED_FUNCTION_EXPORTS {
        if !matches!(module.get_export(name), Some(ExternType::Func(_))) {
            return Err(WasmError::MissingExport(name.to_string()));
        }
    }
    Ok(())
}

/// Builds the linker offering the nested-loader primitive.
///
/// `require` reads the relative path and the JSON context from guest memory,
/// asks the instance's [`Require`] for the placeholder markup, copies it into
/// a buffer obtained from the guest's `allocate`, stores the length at
/// `out_len_ptr` and returns the buffer pointer.
pub fn create_linker(engine: &Engine) -> WasmResult<Linker<FragmentHost>> {
    let mut linker = Linker::new(engine);
    linker
        .func_wrap(
            HOST_MODULE,
            REQUIRE_FUNCTION,
            |mut caller: Caller<'_, FragmentHost>,
             path_ptr: i32,
             path_len: i32,
             ctx_ptr: i32,
             ctx_len: i32,
             out_len_ptr: i32|
             -> Result<i32> {
                let memory = caller
                    .get_export("memory")
                    .and_then(Extern::into_memory)
                    .ok_or_else(|| Error::msg("fragment does not export 'memory'"))?;

                let path = String::from_utf8(read_guest(&memory, &caller, path_ptr, path_len)?)?;
                let context = read_guest(&memory, &caller, ctx_ptr, ctx_len)?;
                let data: serde_json::Value = if context.is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::from_slice(&context)?
                };
                let markup = caller.data().require.placeholder(&path, &data);

                let allocate = caller
                    .get_export("allocate")
                    .and_then(Extern::into_func)
                    .ok_or_else(|| Error::msg("fragment does not export 'allocate'"))?
                    .typed::<i32, i32>(&caller)?;
                let ptr = allocate.call(&mut caller, markup.len() as i32)?;
                if ptr == 0 {
                    return Err(Error::msg("allocate returned null for require output"));
                }
                memory.write(&mut caller, ptr as usize, markup.as_bytes())?;
                memory.write(
                    &mut caller,
                    out_len_ptr as usize,
                    &(markup.len() as i32).to_le_bytes(),
                )?;
                Ok(ptr)
            },
        )
        .map_err(|e| WasmError::EngineError(e.to_string()))?;
    Ok(linker)
}

fn read_guest(
    memory: &Memory,
    store: impl AsContext,
    ptr: i32,
    len: i32,
) -> Result<Vec<u8>> {
    if ptr < 0 || len < 0 {
        return Err(Error::msg(format!(
            "negative pointer or length: ptr={}, len={}",
            ptr, len
        )));
    }
    let mut buffer = vec![0u8; len as usize];
    memory.read(store, ptr as usize, &mut buffer)?;
    Ok(buffer)
}
