// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::PathError;
use crate::store::path::{self, SlotRef};
use crate::store::Value;

/// A resolution scope: a shared root plus an optional base path inside it.
///
/// Literal contexts get a fresh root; mount contexts bound to a store path
/// share the store root and carry the path as their base. Cloning a scope
/// shares the root.
#[derive(Debug, Clone)]
pub struct Scope {
    root: Rc<RefCell<Value>>,
    base: Option<String>,
}

impl Scope {
    pub fn new(root: Value) -> Self {
        Self::from_root(Rc::new(RefCell::new(root)))
    }

    pub fn from_root(root: Rc<RefCell<Value>>) -> Self {
        Self { root, base: None }
    }

    pub fn root(&self) -> &Rc<RefCell<Value>> {
        &self.root
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// `path` prefixed with the base path.
    pub fn full_path(&self, path: &str) -> String {
        match &self.base {
            Some(base) => format!("{}.{}", base, path),
            None => path.to_string(),
        }
    }

    /// Narrows the scope to `path`, creating an empty mapping there when the
    /// slot is empty.
    ///
    /// The narrowed scope holds the concrete path, not the mapping itself:
    /// if the store later replaces the value at that path, reads and writes
    /// through the scope follow the replacement.
    pub fn scope_at(&self, path: &str) -> Result<Scope, PathError> {
        let slot = self.resolve(path)?;
        if slot.is_empty() {
            slot.set(Value::map())?;
        }
        Ok(Scope {
            root: Rc::clone(&self.root),
            base: Some(slot.path()),
        })
    }

    pub fn resolve(&self, path: &str) -> Result<SlotRef, PathError> {
        path::resolve(path, self)
    }

    pub fn get(&self, path: &str) -> Result<Value, PathError> {
        path::get_value_from_path(path, self)
    }

    pub fn set(&self, path: &str, value: Value) -> Result<(), PathError> {
        self.resolve(path)?.set(value)
    }

    /// Applies `f` to the current value at `path` and stores the result.
    pub fn update<F>(&self, path: &str, f: F) -> Result<(), PathError>
    where
        F: FnOnce(Value) -> Value,
    {
        let slot = self.resolve(path)?;
        let next = f(slot.get());
        slot.set(next)
    }

    /// Copy of the value the scope addresses (the whole root, or the entry
    /// at the base path).
    pub fn snapshot(&self) -> Value {
        match &self.base {
            None => self.root.borrow().clone(),
            Some(base) => Scope::from_root(Rc::clone(&self.root))
                .get(base)
                .unwrap_or(Value::Null),
        }
    }

    /// Same root and same base.
    pub fn same_as(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.root, &other.root) && self.base == other.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_at_creates_empty_mapping() {
        let scope = Scope::new(Value::from(json!({"products": [{"name": "a"}]})));
        let product = scope.scope_at("products.0").unwrap();
        assert_eq!(product.get("name").unwrap(), Value::from("a"));

        let fresh = scope.scope_at("details").unwrap();
        assert_eq!(fresh.snapshot(), Value::map());
        fresh.set("open", Value::from(true)).unwrap();
        assert_eq!(
            scope.get("details.open").unwrap(),
            Value::from(true)
        );
    }

    #[test]
    fn test_nested_scopes_share_root() {
        let scope = Scope::new(Value::map());
        let inner = scope.scope_at("a").unwrap().scope_at("b").unwrap();
        assert_eq!(inner.base(), Some("a.b"));
        inner.set("c", Value::from(1)).unwrap();
        assert_eq!(scope.snapshot().to_json(), json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_update_reads_then_writes() {
        let scope = Scope::new(Value::from(json!({"count": 1})));
        scope
            .update("count", |v| Value::from(!v.is_truthy()))
            .unwrap();
        assert_eq!(scope.get("count").unwrap(), Value::from(false));
    }
}
