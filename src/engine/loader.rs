// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use crate::dom::Document;
use crate::engine::registry::FragmentInstance;
use crate::errors::{CompileError, LoadError};
use crate::observability::messages::fragment::{
    FragmentCacheHit, FragmentCompiled, FragmentRendered, StylesInjected,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{FragmentCompiler, FragmentModule, FragmentSource, Require};

/// Fetches, compiles, caches and renders fragments.
///
/// Compiled modules are cached per normalized identifier for the loader's
/// whole lifetime; failed loads leave nothing behind. Companion styles are
/// injected into the document head once per identifier.
pub struct FragmentLoader {
    source: Arc<dyn FragmentSource>,
    compilers: Vec<Box<dyn FragmentCompiler>>,
    extension: String,
    load_attribute: String,
    context_attribute: String,
    cache: HashMap<String, Rc<dyn FragmentModule>>,
    styled: HashSet<String>,
}

impl FragmentLoader {
    pub fn new(
        source: Arc<dyn FragmentSource>,
        compilers: Vec<Box<dyn FragmentCompiler>>,
        extension: &str,
        load_attribute: &str,
        context_attribute: &str,
    ) -> Self {
        Self {
            source,
            compilers,
            extension: extension.to_string(),
            load_attribute: load_attribute.to_string(),
            context_attribute: context_attribute.to_string(),
            cache: HashMap::new(),
            styled: HashSet::new(),
        }
    }

    /// Appends the fragment extension when the identifier lacks it.
    pub fn normalize(&self, identifier: &str) -> String {
        if identifier.ends_with(&self.extension) {
            identifier.to_string()
        } else {
            format!("{}{}", identifier, self.extension)
        }
    }

    pub fn is_cached(&self, identifier: &str) -> bool {
        self.cache.contains_key(identifier)
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// The compiled module for a normalized identifier, fetching and
    /// compiling it on a cache miss.
    pub async fn module(&mut self, identifier: &str) -> Result<Rc<dyn FragmentModule>, LoadError> {
        if let Some(module) = self.cache.get(identifier) {
            FragmentCacheHit { identifier }.log();
            return Ok(Rc::clone(module));
        }

        let bytes = self.source.fetch(identifier).await?;
        let compiler = self
            .compilers
            .iter()
            .find(|c| c.accepts(&bytes))
            .ok_or_else(|| CompileError::NoCompiler(identifier.to_string()))?;
        let require = Require::new(identifier, &self.load_attribute, &self.context_attribute);
        let module = compiler.compile(identifier, &bytes, require)?;

        FragmentCompiled {
            identifier,
            kind: module.kind(),
        }
        .log();
        self.cache.insert(identifier.to_string(), Rc::clone(&module));
        Ok(module)
    }

    /// Writes the module's styles into `<head>` unless this identifier's
    /// styles were injected before.
    pub fn inject_styles(
        &mut self,
        document: &mut Document,
        identifier: &str,
        module: &dyn FragmentModule,
    ) -> Result<(), LoadError> {
        if self.styled.contains(identifier) {
            return Ok(());
        }
        let styles = module.styles()?;
        self.styled.insert(identifier.to_string());
        let Some(css) = styles else {
            return Ok(());
        };

        let style_id = style_id(identifier);
        let style = document.create_element("style");
        document.set_attribute(style, "id", &style_id)?;
        document.set_text_content(style, &css)?;
        let head = document.head();
        document.append_child(head, style)?;

        StylesInjected {
            identifier,
            style_id: &style_id,
            size_bytes: css.len(),
        }
        .log();
        Ok(())
    }

    /// Renders an instance from a JSON snapshot of its context and rewrites
    /// the mount only when the markup differs from the last write. Returns
    /// whether the mount was rewritten.
    pub fn render(
        &self,
        document: &mut Document,
        instance: &mut FragmentInstance,
    ) -> Result<bool, LoadError> {
        let data = instance.context.snapshot().to_json();
        let output = instance.module.render(&data)?;
        let changed = instance.last_output.as_deref() != Some(output.as_str());
        if changed {
            document.set_inner_html(instance.mount, &output)?;
        }
        FragmentRendered {
            identifier: &instance.identifier,
            mount: instance.mount,
            changed,
            output_size: output.len(),
        }
        .log();
        if changed {
            instance.last_output = Some(output);
        }
        Ok(changed)
    }
}

/// `style-` followed by the identifier with a leading `./` dropped and
/// slashes turned into dashes.
pub fn style_id(identifier: &str) -> String {
    let trimmed = identifier.trim_start_matches("./").trim_start_matches('/');
    format!("style-{}", trimmed.replace('/', "-"))
}
