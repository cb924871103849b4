// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for the fragment pipeline: fetch, compile, render and mount.

use crate::backends::wasm::WasmError;
use crate::dom::NodeId;
use crate::errors::{BindingError, ContextError, DomError, PathError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("I/O error reading '{identifier}': {source}")]
    Io {
        identifier: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error fetching '{identifier}': {source}")]
    Http {
        identifier: String,
        #[source]
        source: reqwest::Error,
    },

    /// The identifier escapes the configured fragment root.
    #[error("fragment '{0}' resolves outside the fragment root")]
    OutsideRoot(String),

    #[error("fragment '{identifier}' is too large: {size} bytes (max: {max} bytes)")]
    TooLarge {
        identifier: String,
        size: usize,
        max: usize,
    },

    #[error("fragment '{0}' not found")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum CompileError {
    /// No registered compiler recognised the fetched bytes.
    #[error("no compiler accepts fragment '{0}'")]
    NoCompiler(String),

    #[error("fragment source is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("template syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error(transparent)]
    Wasm(#[from] WasmError),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("fragment render failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Wasm(#[from] WasmError),
}

/// Mounting a fragment at a placeholder element failed.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("node {0} has no load attribute")]
    NotAMountPoint(NodeId),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Binding(#[from] BindingError),
}
