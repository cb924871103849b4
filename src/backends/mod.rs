// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fragment backends.
//!
//! A fragment travels through two pluggable stages before it can be mounted:
//!
//! ```text
//! identifier → FragmentSource (bytes) → FragmentCompiler (module) → render(data)
//! ```
//!
//! # Sources
//! - **Filesystem**: rooted below a directory, `..` refused, size-limited
//! - **HTTP**: `GET <base_url><identifier>` with `reqwest`
//!
//! # Compilers
//! Tried in registration order; the first that accepts the bytes wins.
//!
//! ## WASM Backend
//! Core modules run in a Wasmtime sandbox with a fuel budget per call. The
//! only import offered is the nested-loader primitive `soulbind.require`.
//!
//! ## Template Backend
//! A mustache-style interpreter over the JSON context. Templates can only
//! read their data and reach other fragments through the same nested-loader
//! primitive.
//!
//! ## Stub Backend (Test-Only)
//! In-memory sources and counting compilers for engine tests:
//! - **StubSource**: serves fragments from a map and counts fetches
//! - **CountingCompiler**: template compiler that counts compilations
//! - **Note**: NOT available in production builds
//!
//! # Examples
//!
//! ```rust,no_run
//! use soulbind::backends::sources::FsFragmentSource;
//! use soulbind::traits::FragmentSource;
//!
//! # async fn demo() -> Result<(), soulbind::errors::FetchError> {
//! let source = FsFragmentSource::new("./public", 16 * 1024 * 1024);
//! let bytes = source.fetch("templates/mainSlider.frag").await?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

pub mod sources;
#[cfg(test)]
pub mod stub;
pub mod template;
pub mod wasm;
