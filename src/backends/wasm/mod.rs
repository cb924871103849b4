// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sandboxed WASM fragments.
//!
//! A WASM fragment is a core module with the C-style memory protocol:
//!
//! ```text
//! memory                                   exported linear memory
//! allocate(size) -> ptr                    guest allocator
//! deallocate(ptr, size)                    guest deallocator
//! render(ptr, len, out_len_ptr) -> ptr     JSON context in, markup out
//! styles(out_len_ptr) -> ptr               optional companion CSS
//! ```
//!
//! The only import offered is `soulbind.require`, the nested-loader
//! primitive. Every call runs in a fresh instance with its own fuel budget.

pub mod capability_manager;
mod compiler;
pub mod detector;
mod error;
mod module;

pub use compiler::WasmFragmentCompiler;
pub use detector::{detect_encoding, has_wasm_magic, WasmEncoding};
pub use error::{WasmError, WasmResult};
pub use module::WasmFragment;
