// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The application store.
//!
//! A single nested mapping behind a reference-counted root. The engine owns
//! one and threads it to every component that resolves paths; tests build
//! their own.

pub mod path;
mod scope;
mod value;

pub use path::{get_value_from_path, resolve, Segment, SlotRef, WILDCARD};
pub use scope::Scope;
pub use value::{Computed, Invocation, Value};

use crate::errors::PathError;

/// Root store. Clones share the same root.
#[derive(Debug, Clone)]
pub struct Store {
    scope: Scope,
}

impl Store {
    pub fn new() -> Self {
        Self {
            scope: Scope::new(Value::map()),
        }
    }

    /// Seeds the store from JSON. Anything but an object yields an empty store.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(_) => Self {
                scope: Scope::new(Value::from(json)),
            },
            _ => Self::new(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn get(&self, path: &str) -> Result<Value, PathError> {
        self.scope.get(path)
    }

    pub fn set(&self, path: &str, value: Value) -> Result<(), PathError> {
        self.scope.set(path, value)
    }

    pub fn resolve(&self, path: &str) -> Result<SlotRef, PathError> {
        self.scope.resolve(path)
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.scope.snapshot().to_json()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_independent_stores() {
        let a = Store::new();
        let b = Store::new();
        a.set("x", Value::from(1)).unwrap();
        assert_eq!(b.get("x").unwrap(), Value::Null);
    }

    #[test]
    fn test_clones_share_root() {
        let a = Store::from_json(json!({"x": 1}));
        let b = a.clone();
        b.set("x", Value::from(2)).unwrap();
        assert_eq!(a.to_json(), json!({"x": 2}));
    }

    #[test]
    fn test_non_object_seed_is_ignored() {
        let store = Store::from_json(json!([1, 2]));
        assert_eq!(store.to_json(), json!({}));
    }
}
