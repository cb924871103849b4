// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for WASM fragment loading and execution events.
//!
//! This module contains message types for logging events related to:
//! * WASM fragment compilation and capability checks
//! * Binary encoding detection
//! * Engine creation
//! * `render` / `styles` calls and their fuel usage

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// WASM fragment module compiled successfully.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use soulbind::observability::messages::wasm::ModuleLoaded;
///
/// let msg = ModuleLoaded {
///     identifier: "fragments/tile.frag",
///     size_bytes: 4096,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ModuleLoaded<'a> {
    pub identifier: &'a str,
    pub size_bytes: usize,
}

impl Display for ModuleLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded WASM fragment module: {} ({} bytes)",
            self.identifier, self.size_bytes
        )
    }
}

impl StructuredLog for ModuleLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            identifier = self.identifier,
            size_bytes = self.size_bytes,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "wasm_module_loaded",
            span_name = name,
            identifier = self.identifier,
        )
    }
}

/// WASM fragment module rejected or failed to compile.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use soulbind::observability::messages::wasm::ModuleLoadFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad magic");
/// let msg = ModuleLoadFailed {
///     identifier: "fragments/broken.frag",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ModuleLoadFailed<'a> {
    pub identifier: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ModuleLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load WASM fragment module '{}': {}",
            self.identifier, self.error
        )
    }
}

impl StructuredLog for ModuleLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(
            identifier = self.identifier,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "wasm_module_load_failed",
            span_name = name,
            identifier = self.identifier,
        )
    }
}

/// WASM binary encoding detected.
///
/// # Log Level
/// `debug!` - Detail of the compile step
pub struct EncodingDetected<'a> {
    pub identifier: &'a str,
    pub encoding: &'a str,
}

impl Display for EncodingDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Detected {} encoding for fragment: {}",
            self.encoding, self.identifier
        )
    }
}

impl StructuredLog for EncodingDetected<'_> {
    fn log(&self) {
        tracing::debug!(
            identifier = self.identifier,
            encoding = self.encoding,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "wasm_encoding",
            span_name = name,
            identifier = self.identifier,
            encoding = self.encoding,
        )
    }
}

/// WASM engine created for fragment compilation.
///
/// # Log Level
/// `info!` - Happens once per engine
///
/// # Example
/// ```
/// use soulbind::observability::messages::wasm::EngineCreated;
///
/// let msg = EngineCreated {
///     fuel_level: 100_000_000,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct EngineCreated {
    pub fuel_level: u64,
}

impl Display for EngineCreated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Created WASM fragment engine with fuel_level={}",
            self.fuel_level
        )
    }
}

impl StructuredLog for EngineCreated {
    fn log(&self) {
        tracing::info!(fuel_level = self.fuel_level, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "wasm_engine",
            span_name = name,
            fuel_level = self.fuel_level,
        )
    }
}

/// A fragment export is about to be called.
///
/// # Log Level
/// `debug!` - One per render
pub struct ExecutionStarted<'a> {
    pub identifier: &'a str,
    pub export: &'a str,
    pub input_size: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Calling '{}' of WASM fragment '{}': input_size={} bytes",
            self.export, self.identifier, self.input_size
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            identifier = self.identifier,
            export = self.export,
            input_size = self.input_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "wasm_execution",
            span_name = name,
            identifier = self.identifier,
            export = self.export,
        )
    }
}

/// A fragment export returned.
///
/// # Log Level
/// `debug!` - One per render
pub struct ExecutionCompleted<'a> {
    pub identifier: &'a str,
    pub export: &'a str,
    pub output_size: usize,
    pub fuel_consumed: u64,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "WASM fragment '{}' '{}' returned {} bytes using {} fuel",
            self.identifier, self.export, self.output_size, self.fuel_consumed
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            identifier = self.identifier,
            export = self.export,
            output_size = self.output_size,
            fuel_consumed = self.fuel_consumed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "wasm_execution_completed",
            span_name = name,
            identifier = self.identifier,
            export = self.export,
        )
    }
}

/// A fragment export trapped, ran out of fuel, or broke the memory protocol.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ExecutionFailed<'a> {
    pub identifier: &'a str,
    pub export: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "WASM fragment '{}' failed in '{}': {}",
            self.identifier, self.export, self.error
        )
    }
}

impl StructuredLog for ExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            identifier = self.identifier,
            export = self.export,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "wasm_execution_failed",
            span_name = name,
            identifier = self.identifier,
        )
    }
}
