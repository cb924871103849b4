// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::dom::{Document, NodeId};
use crate::errors::ContextError;
use crate::store::{Scope, Store, Value};

/// Side table of per-element resolution scopes.
///
/// Two kinds of entry live here:
/// * literal contexts parsed from the context attribute, once per element
///   and shared by every processor;
/// * mount contexts, recorded by the loader for each fragment mount and
///   inherited by the elements rendered inside it.
#[derive(Debug)]
pub struct ContextTable {
    context_attribute: String,
    literals: HashMap<NodeId, Option<Scope>>,
    mounts: HashMap<NodeId, Scope>,
}

impl ContextTable {
    pub fn new(context_attribute: &str) -> Self {
        Self {
            context_attribute: context_attribute.to_string(),
            literals: HashMap::new(),
            mounts: HashMap::new(),
        }
    }

    /// The element's own literal context, parsed on first use.
    ///
    /// A literal that parses to a falsy JSON value (`null`, `false`, `0`,
    /// `""`) counts as absent. A malformed literal is not cached.
    pub fn literal(
        &mut self,
        document: &Document,
        node: NodeId,
    ) -> Result<Option<Scope>, ContextError> {
        if let Some(cached) = self.literals.get(&node) {
            return Ok(cached.clone());
        }
        let scope = match document.get_attribute(node, &self.context_attribute) {
            None => None,
            Some(raw) => {
                let json: serde_json::Value = serde_json::from_str(raw)?;
                let value = Value::from(json);
                value.is_truthy().then(|| Scope::new(value))
            }
        };
        self.literals.insert(node, scope.clone());
        Ok(scope)
    }

    /// Scope for a processor attaching to `node`: its literal context, else
    /// the nearest enclosing mount's context, else the store.
    pub fn resolve(
        &mut self,
        document: &Document,
        node: NodeId,
        store: &Store,
    ) -> Result<Scope, ContextError> {
        if let Some(scope) = self.literal(document, node)? {
            return Ok(scope);
        }
        Ok(self.ambient(document, node, store))
    }

    /// Context of the nearest mount strictly above `node`, else the store.
    pub fn ambient(&self, document: &Document, node: NodeId, store: &Store) -> Scope {
        let mut current = document.parent(node);
        while let Some(ancestor) = current {
            if let Some(scope) = self.mounts.get(&ancestor) {
                return scope.clone();
            }
            current = document.parent(ancestor);
        }
        store.scope().clone()
    }

    pub fn set_mount(&mut self, mount: NodeId, scope: Scope) {
        self.mounts.insert(mount, scope);
    }

    pub fn mount(&self, mount: NodeId) -> Option<&Scope> {
        self.mounts.get(&mount)
    }

    pub fn forget(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.literals.remove(id);
            self.mounts.remove(id);
        }
    }
}
