// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // fragment sources and compilers
pub mod binding;    // bind / toggle / action processors
pub mod config;     // yaml config
pub mod dom;        // arena document + mutation records
pub mod engine;     // change bus, loader, registry, observer
pub mod errors;     // error handling
pub mod observability;
pub mod store;      // path-addressed state
pub mod traits;     // unified abstractions
