// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for WASM fragment operations.
//!
//! Covers every stage a WASM fragment goes through: binary detection,
//! capability checks on imports, compilation, and the render call itself.

use thiserror::Error;

/// Error message for Component Model binaries, which fragments cannot be.
pub const WASM_UNSUPPORTED_ENCODING: &str = "Unsupported WASM binary: fragments must be core \
modules exporting memory, allocate, deallocate and render; Component Model binaries are not supported.";

#[derive(Error, Debug)]
pub enum WasmError {
    /// Invalid or malformed WASM binary format.
    #[error("Invalid WASM binary: {0}")]
    InvalidWasmBinary(String),

    /// Component Model or legacy component binaries.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// The module imports something outside the fragment capability set.
    #[error("Import '{module}.{name}' is not permitted for fragments")]
    ForbiddenImport { module: String, name: String },

    /// A required export is missing or has the wrong signature.
    #[error("Missing or mistyped export '{0}'")]
    MissingExport(String),

    /// Memory allocation or access error in WASM linear memory.
    #[error("Memory error: {0}")]
    MemoryError(String),

    /// Invalid pointer value (null or out of bounds).
    #[error("Invalid pointer: {0}")]
    InvalidPointer(i32),

    /// Module compilation or instantiation error.
    #[error("WASM module error: {0}")]
    ModuleError(String),

    /// UTF-8 decoding error for string data.
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// Wasmtime runtime execution error (traps, fuel exhaustion).
    #[error("WASM execution error: {0}")]
    ExecutionError(#[from] wasmtime::Error),

    /// Wasmtime engine creation or configuration error.
    #[error("Engine creation error: {0}")]
    EngineError(String),

    /// WASM binary parsing error from wasmparser.
    #[error("WASM parser error: {0}")]
    ParserError(#[from] wasmparser::BinaryReaderError),
}

pub type WasmResult<T> = Result<T, WasmError>;
