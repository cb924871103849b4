// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::rc::Rc;

use crate::backends::wasm::capability_manager::{
    create_engine, create_linker, validate_exports, validate_imports,
};
use crate::backends::wasm::detector::{detect_encoding, has_wasm_magic, WasmEncoding};
use crate::backends::wasm::error::{WasmError, WasmResult, WASM_UNSUPPORTED_ENCODING};
use crate::backends::wasm::module::WasmFragment;
use crate::config::FuelConfig;
use crate::errors::CompileError;
use crate::observability::messages::wasm::{
    EncodingDetected, EngineCreated, ModuleLoadFailed, ModuleLoaded,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{FragmentCompiler, FragmentModule, Require};
use wasmtime::{Engine, Module};

/// Compiles core WASM modules into sandboxed fragments.
///
/// Compilation runs three checks before a module is accepted:
/// 1. **Encoding** - only core modules; Component Model binaries are rejected
/// 2. **Imports** - nothing but `soulbind.require`
/// 3. **Exports** - `memory`, `allocate`, `deallocate`, `render`
///
/// One engine is shared by every fragment this compiler produces.
pub struct WasmFragmentCompiler {
    engine: Engine,
    fuel: u64,
}

impl WasmFragmentCompiler {
    pub fn new(fuel: &FuelConfig) -> WasmResult<Self> {
        let engine = create_engine()?;
        let fuel = fuel.effective();
        EngineCreated { fuel_level: fuel }.log();
        Ok(Self { engine, fuel })
    }

    fn compile_module(&self, identifier: &str, bytes: &[u8]) -> WasmResult<Module> {
        let encoding = detect_encoding(bytes)?;
        EncodingDetected {
            identifier,
            encoding: encoding.as_str(),
        }
        .log();
        if encoding != WasmEncoding::CoreModule {
            return Err(WasmError::UnsupportedEncoding(
                WASM_UNSUPPORTED_ENCODING.to_string(),
            ));
        }

        let module = Module::new(&self.engine, bytes)
            .map_err(|e| WasmError::ModuleError(e.to_string()))?;
        validate_imports(&module)?;
        validate_exports(&module)?;
        Ok(module)
    }
}

impl FragmentCompiler for WasmFragmentCompiler {
    fn name(&self) -> &'static str {
        "wasm"
    }

    fn accepts(&self, bytes: &[u8]) -> bool {
        has_wasm_magic(bytes)
    }

    fn compile(
        &self,
        identifier: &str,
        bytes: &[u8],
        require: Require,
    ) -> Result<Rc<dyn FragmentModule>, CompileError> {
        let module = match self.compile_module(identifier, bytes) {
            Ok(module) => module,
            Err(error) => {
                ModuleLoadFailed {
                    identifier,
                    error: &error,
                }
                .log();
                return Err(error.into());
            }
        };
        let linker = create_linker(&self.engine)?;

        ModuleLoaded {
            identifier,
            size_bytes: bytes.len(),
        }
        .log();

        Ok(Rc::new(WasmFragment::new(
            identifier,
            self.engine.clone(),
            module,
            linker,
            require,
            self.fuel,
        )))
    }
}
