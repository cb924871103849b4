// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fragment sources.
//!
//! A source turns a normalized fragment identifier into raw bytes. Two are
//! bundled:
//! - [`FsFragmentSource`] reads below a root directory with `tokio::fs`
//! - [`HttpFragmentSource`] fetches relative to a base URL with `reqwest`
//!
//! [`source_from_options`] picks one from the `fragments` config section.

mod fs;
mod http;

pub use fs::FsFragmentSource;
pub use http::HttpFragmentSource;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::FragmentOptions;
use crate::traits::FragmentSource;

/// Builds the source described by `options`: HTTP when `base_url` is set,
/// otherwise the filesystem under `root` (the working directory by default).
pub fn source_from_options(options: &FragmentOptions) -> Arc<dyn FragmentSource> {
    match &options.base_url {
        Some(base_url) => Arc::new(HttpFragmentSource::new(base_url, options.max_size_bytes)),
        None => Arc::new(FsFragmentSource::new(
            options.root.clone().unwrap_or_else(|| PathBuf::from(".")),
            options.max_size_bytes,
        )),
    }
}
