// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::wasm::capability_manager::FragmentHost;
use crate::backends::wasm::error::{WasmError, WasmResult};
use crate::errors::RenderError;
use crate::observability::messages::wasm::{ExecutionCompleted, ExecutionFailed, ExecutionStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{FragmentModule, Require};
use wasmtime::*;

/// A compiled core-module fragment.
///
/// Every call gets a fresh store and instance, so fragments keep no state
/// between renders, and a fresh fuel budget.
pub struct WasmFragment {
    identifier: String,
    engine: Engine,
    module: Module,
    linker: Linker<FragmentHost>,
    require: Require,
    fuel: u64,
}

impl WasmFragment {
    pub fn new(
        identifier: &str,
        engine: Engine,
        module: Module,
        linker: Linker<FragmentHost>,
        require: Require,
        fuel: u64,
    ) -> Self {
        Self {
            identifier: identifier.to_string(),
            engine,
            module,
            linker,
            require,
            fuel,
        }
    }

    fn instantiate(&self) -> WasmResult<(Store<FragmentHost>, Instance)> {
        let mut store = Store::new(
            &self.engine,
            FragmentHost {
                require: self.require.clone(),
            },
        );
        store.set_fuel(self.fuel)?;
        let instance = self.linker.instantiate(&mut store, &self.module)?;
        Ok((store, instance))
    }

    fn call_export(&self, export: &str, input: Option<&[u8]>) -> WasmResult<Vec<u8>> {
        ExecutionStarted {
            identifier: &self.identifier,
            export,
            input_size: input.map_or(0, <[u8]>::len),
        }
        .log();

        let result = self
            .instantiate()
            .and_then(|(mut store, instance)| {
                let output = Self::invoke(&mut store, &instance, export, input)?;
                let remaining = store.get_fuel().unwrap_or(0);
                Ok((output, self.fuel.saturating_sub(remaining)))
            });

        match result {
            Ok((output, fuel_consumed)) => {
                ExecutionCompleted {
                    identifier: &self.identifier,
                    export,
                    output_size: output.len(),
                    fuel_consumed,
                }
                .log();
                Ok(output)
            }
            Err(error) => {
                ExecutionFailed {
                    identifier: &self.identifier,
                    export,
                    error: &error,
                }
                .log();
                Err(error)
            }
        }
    }

    /// Runs `render(ptr, len, out_len_ptr)` or `styles(out_len_ptr)` with the
    /// allocate/deallocate memory protocol and returns the output bytes.
    fn invoke(
        store: &mut Store<FragmentHost>,
        instance: &Instance,
        export: &str,
        input: Option<&[u8]>,
    ) -> WasmResult<Vec<u8>> {
        let memory = instance
            .get_memory(&mut *store, "memory")
            .ok_or_else(|| WasmError::MissingExport("memory".to_string()))?;

        let allocate_func = instance
            .get_typed_func::<i32, i32>(&mut *store, "allocate")
            .map_err(|_| WasmError::MissingExport("allocate".to_string()))?;

        let deallocate_func = instance
            .get_typed_func::<(i32, i32), ()>(&mut *store, "deallocate")
            .map_err(|_| WasmError::MissingExport("deallocate".to_string()))?;

        // 4 bytes for the i32 output length
        let output_len_ptr = allocate_func.call(&mut *store, 4)?;
        if output_len_ptr == 0 {
            return Err(WasmError::MemoryError(
                "Failed to allocate output length memory".to_string(),
            ));
        }

        let result_ptr = match input {
            Some(input_bytes) => {
                let render_func = instance
                    .get_typed_func::<(i32, i32, i32), i32>(&mut *store, export)
                    .map_err(|_| WasmError::MissingExport(export.to_string()))?;

                let input_ptr = allocate_func.call(&mut *store, input_bytes.len() as i32)?;
                if input_ptr == 0 {
                    let _ = deallocate_func.call(&mut *store, (output_len_ptr, 4));
                    return Err(WasmError::MemoryError(
                        "Failed to allocate input memory".to_string(),
                    ));
                }
                memory
                    .write(&mut *store, input_ptr as usize, input_bytes)
                    .map_err(|e| WasmError::MemoryError(e.to_string()))?;

                let result_ptr = match render_func.call(
                    &mut *store,
                    (input_ptr, input_bytes.len() as i32, output_len_ptr),
                ) {
                    Ok(ptr) => ptr,
                    Err(e) => {
                        let _ = deallocate_func
                            .call(&mut *store, (input_ptr, input_bytes.len() as i32));
                        let _ = deallocate_func.call(&mut *store, (output_len_ptr, 4));
                        return Err(e.into());
                    }
                };
                deallocate_func.call(&mut *store, (input_ptr, input_bytes.len() as i32))?;
                result_ptr
            }
            None => {
                let styles_func = instance
                    .get_typed_func::<i32, i32>(&mut *store, export)
                    .map_err(|_| WasmError::MissingExport(export.to_string()))?;
                match styles_func.call(&mut *store, output_len_ptr) {
                    Ok(ptr) => ptr,
                    Err(e) => {
                        let _ = deallocate_func.call(&mut *store, (output_len_ptr, 4));
                        return Err(e.into());
                    }
                }
            }
        };

        if result_ptr == 0 {
            let _ = deallocate_func.call(&mut *store, (output_len_ptr, 4));
            return Err(WasmError::InvalidPointer(result_ptr));
        }

        let mut output_len_bytes = [0u8; 4];
        memory
            .read(&mut *store, output_len_ptr as usize, &mut output_len_bytes)
            .map_err(|e| WasmError::MemoryError(e.to_string()))?;
        let output_len = i32::from_le_bytes(output_len_bytes);
        deallocate_func.call(&mut *store, (output_len_ptr, 4))?;

        if output_len < 0 {
            return Err(WasmError::MemoryError(format!(
                "Negative output length: {}",
                output_len
            )));
        }

        let mut output_bytes = vec![0u8; output_len as usize];
        memory
            .read(&mut *store, result_ptr as usize, &mut output_bytes)
            .map_err(|e| WasmError::MemoryError(e.to_string()))?;
        deallocate_func.call(&mut *store, (result_ptr, output_len))?;

        Ok(output_bytes)
    }
}

impl FragmentModule for WasmFragment {
    fn render(&self, data: &serde_json::Value) -> Result<String, RenderError> {
        let input = data.to_string();
        let output = self.call_export("render", Some(input.as_bytes()))?;
        Ok(String::from_utf8(output).map_err(WasmError::from)?)
    }

    fn styles(&self) -> Result<Option<String>, RenderError> {
        if !matches!(self.module.get_export("styles"), Some(ExternType::Func(_))) {
            return Ok(None);
        }
        let output = self.call_export("styles", None)?;
        let css = String::from_utf8(output).map_err(WasmError::from)?;
        Ok(Some(css).filter(|css| !css.is_empty()))
    }

    fn kind(&self) -> &'static str {
        "wasm"
    }
}
