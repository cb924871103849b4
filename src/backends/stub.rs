// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backends::template::TemplateCompiler;
use crate::errors::{CompileError, FetchError};
use crate::traits::{FragmentCompiler, FragmentModule, FragmentSource, Require};

/// An in-memory fragment source that counts fetches per identifier.
#[derive(Default)]
pub struct StubSource {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, identifier: &str, content: impl AsRef<[u8]>) -> Self {
        self.insert(identifier, content);
        self
    }

    pub fn insert(&self, identifier: &str, content: impl AsRef<[u8]>) {
        self.files
            .lock()
            .unwrap()
            .insert(identifier.to_string(), content.as_ref().to_vec());
    }

    pub fn fetch_count(&self, identifier: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(identifier)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl FragmentSource for StubSource {
    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, FetchError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(identifier.to_string())
            .or_insert(0) += 1;
        self.files
            .lock()
            .unwrap()
            .get(identifier)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(identifier.to_string()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Wraps the template compiler and counts successful compilations.
pub struct CountingCompiler {
    inner: TemplateCompiler,
    compiles: Rc<Cell<usize>>,
}

impl CountingCompiler {
    pub fn with_counter() -> (Self, Rc<Cell<usize>>) {
        let compiles = Rc::new(Cell::new(0));
        (
            Self {
                inner: TemplateCompiler::new(),
                compiles: compiles.clone(),
            },
            compiles,
        )
    }
}

impl FragmentCompiler for CountingCompiler {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn accepts(&self, bytes: &[u8]) -> bool {
        self.inner.accepts(bytes)
    }

    fn compile(
        &self,
        identifier: &str,
        bytes: &[u8],
        require: Require,
    ) -> Result<Rc<dyn FragmentModule>, CompileError> {
        let module = self.inner.compile(identifier, bytes, require)?;
        self.compiles.set(self.compiles.get() + 1);
        Ok(module)
    }
}
