// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic the engine emits is a message struct with a `Display`
//! implementation plus a [`messages::StructuredLog`] implementation that logs
//! it at its level with structured fields. Call sites never build log strings
//! by hand.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::binding` - attribute processor attach, refresh and failures
//! * `messages::engine` - change notifications, re-synchronization, mutations
//! * `messages::fragment` - fragment fetch, compile, style injection, render
//! * `messages::wasm` - WASM fragment module loading and execution
//!
//! # Usage
//!
//! ```rust
//! use soulbind::observability::messages::fragment::FragmentCompiled;
//! use soulbind::observability::messages::StructuredLog;
//!
//! FragmentCompiled {
//!     identifier: "templates/productTile.frag",
//!     kind: "template",
//! }
//! .log();
//! ```

pub mod messages;
