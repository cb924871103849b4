// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::rc::Rc;

use crate::errors::{CompileError, RenderError};

/// A compiled fragment: turns a JSON snapshot of its context into markup.
pub trait FragmentModule {
    fn render(&self, data: &serde_json::Value) -> Result<String, RenderError>;

    /// Companion styles, if the fragment exports any.
    fn styles(&self) -> Result<Option<String>, RenderError>;

    /// Short label for logs ("template", "wasm").
    fn kind(&self) -> &'static str;
}

/// Turns fetched fragment bytes into a [`FragmentModule`].
///
/// Compilers are tried in registration order; the first whose `accepts`
/// returns true compiles the fragment.
pub trait FragmentCompiler {
    fn name(&self) -> &'static str;

    fn accepts(&self, bytes: &[u8]) -> bool;

    fn compile(
        &self,
        identifier: &str,
        bytes: &[u8],
        require: Require,
    ) -> Result<Rc<dyn FragmentModule>, CompileError>;
}

/// The nested-loader capability handed to every compiled fragment.
///
/// A fragment cannot load another fragment directly; it asks `require` for a
/// placeholder element, which the tree observer later picks up and mounts.
/// Relative paths resolve against the directory of the requiring fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Require {
    base: String,
    load_attribute: String,
    context_attribute: String,
}

impl Require {
    pub fn new(identifier: &str, load_attribute: &str, context_attribute: &str) -> Self {
        let base = match identifier.rfind('/') {
            Some(slash) => identifier[..=slash].to_string(),
            None => String::new(),
        };
        Self {
            base,
            load_attribute: load_attribute.to_string(),
            context_attribute: context_attribute.to_string(),
        }
    }

    /// Directory prefix prepended to relative paths.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `<div data-load="<dir><relative>" data-context='<json>'></div>`
    pub fn placeholder(&self, relative: &str, data: &serde_json::Value) -> String {
        let source = format!("{}{}", self.base, relative)
            .replace('&', "&amp;")
            .replace('"', "&quot;");
        let context = data
            .to_string()
            .replace('&', "&amp;")
            .replace('\'', "&#39;");
        format!(
            "<div {}=\"{}\" {}='{}'></div>",
            self.load_attribute, source, self.context_attribute, context
        )
    }
}
