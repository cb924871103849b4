// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::sources::source_from_options;
use crate::backends::template::TemplateCompiler;
use crate::backends::wasm::{WasmError, WasmFragmentCompiler};
use crate::config::Config;
use crate::traits::{FragmentCompiler, FragmentSource};

/// Builds the engine's fragment source and compilers from configuration
pub struct EngineFactory;

impl EngineFactory {
    /// The fragment source named by the `fragments` section
    pub fn source(cfg: &Config) -> Arc<dyn FragmentSource> {
        source_from_options(&cfg.fragments)
    }

    /// Compilers in the order they are tried: WASM by magic bytes first,
    /// then the template interpreter for anything that is valid UTF-8.
    pub fn compilers(cfg: &Config) -> Result<Vec<Box<dyn FragmentCompiler>>, WasmError> {
        let compilers: Vec<Box<dyn FragmentCompiler>> = vec![
            Box::new(WasmFragmentCompiler::new(&cfg.wasm.fuel)?),
            Box::new(TemplateCompiler::new()),
        ];
        Ok(compilers)
    }
}
