// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `binding` - attribute processor events
//! * `engine` - change bus, re-synchronization and tree observation
//! * `fragment` - fragment loader and registry events
//! * `wasm` - WASM fragment module events

use tracing::Span;

pub mod binding;
pub mod engine;
pub mod fragment;
pub mod wasm;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emits the message at its level.
    fn log(&self);

    /// A span carrying the message's fields, for scoping follow-up events.
    fn span(&self, name: &str) -> Span;
}
