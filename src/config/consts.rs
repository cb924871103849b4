// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default fuel level for one WASM fragment render (100 million instructions)
pub const DEFAULT_FUEL_LEVEL: u64 = 100_000_000;
/// Minimum allowed fuel level (1 million instructions)
pub const MIN_FUEL_LEVEL: u64 = 1_000_000;
/// Maximum allowed fuel level (500 million instructions) - security limit
pub const MAX_FUEL_LEVEL: u64 = 500_000_000;

pub const DEFAULT_BIND_ATTRIBUTE: &str = "data-bind";
pub const DEFAULT_TOGGLE_ATTRIBUTE: &str = "data-toggle";
pub const DEFAULT_ACTION_ATTRIBUTE: &str = "data-action";
pub const DEFAULT_LOAD_ATTRIBUTE: &str = "data-load";
pub const DEFAULT_CONTEXT_ATTRIBUTE: &str = "data-context";

/// Appended to fragment identifiers that lack it
pub const DEFAULT_FRAGMENT_EXTENSION: &str = ".frag";
/// Maximum allowed size of one fragment source (16 MB)
pub const MAX_FRAGMENT_SIZE: usize = 16 * 1024 * 1024;
