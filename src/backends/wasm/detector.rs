// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WASM binary encoding detection
//!
//! Uses wasmparser to tell core modules (which can be fragments) from
//! Component Model binaries (which cannot).

use crate::backends::wasm::error::{WasmError, WasmResult};

use wasmparser::{Encoding, Parser, Payload};

/// The `\0asm` preamble every WASM binary starts with.
pub const WASM_MAGIC: &[u8; 4] = b"\0asm";

/// Cheap check used to route fetched bytes to the WASM compiler.
pub fn has_wasm_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(WASM_MAGIC)
}

/// Detected binary kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WasmEncoding {
    /// Classic core module (binary version 1, no component section)
    CoreModule,
    /// Component Model binary, or a legacy core module carrying a
    /// `component` custom section
    Component,
}

impl WasmEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CoreModule => "core-module",
            Self::Component => "component",
        }
    }
}

/// Detects the encoding of a WebAssembly binary by inspecting its version
/// header and custom sections.
///
/// # Errors
/// Returns an error if the input is empty, truncated, or otherwise invalid.
pub fn detect_encoding(bytes: &[u8]) -> WasmResult<WasmEncoding> {
    let parser = Parser::new(0);
    let mut encoding = None;
    let mut has_component_section = false;

    for payload in parser.parse_all(bytes) {
        match payload? {
            Payload::Version { encoding: enc, .. } => {
                encoding = Some(enc);
            }
            Payload::CustomSection(reader) if reader.name() == "component" => {
                has_component_section = true;
            }
            _ => {}
        }
    }

    let encoding =
        encoding.ok_or_else(|| WasmError::InvalidWasmBinary("Invalid WASM binary".to_string()))?;

    Ok(match encoding {
        Encoding::Component => WasmEncoding::Component,
        Encoding::Module if has_component_section => WasmEncoding::Component,
        Encoding::Module => WasmEncoding::CoreModule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let empty: &[u8] = &[];
        assert!(detect_encoding(empty).is_err());
        assert!(!has_wasm_magic(empty));
    }

    #[test]
    fn test_invalid_input() {
        let bad = b"\x00\x00\x00\x00\x00\x00\x00\x00";
        assert!(detect_encoding(bad).is_err());
    }

    #[test]
    fn test_core_module_detected() {
        let bytes = wat::parse_str("(module)").unwrap();
        assert!(has_wasm_magic(&bytes));
        assert_eq!(detect_encoding(&bytes).unwrap(), WasmEncoding::CoreModule);
    }

    #[test]
    fn test_component_detected() {
        let bytes = wat::parse_str("(component)").unwrap();
        assert!(has_wasm_magic(&bytes));
        assert_eq!(detect_encoding(&bytes).unwrap(), WasmEncoding::Component);
    }

    #[test]
    fn test_template_text_has_no_magic() {
        assert!(!has_wasm_magic(b"<div>{{name}}</div>"));
    }
}
