// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dotted-path resolution.
//!
//! `resolve` walks a path through a scope and hands back a [`SlotRef`]: the
//! container holding the addressed slot (`cursor`) plus the key or index
//! inside it (`index`). Missing intermediate containers are created on the
//! way down so every resolved slot can be written. A `*` as the final segment
//! addresses the append position of a sequence; as an intermediate segment
//! it only marks that the container before it is a sequence.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::errors::PathError;
use crate::store::{Scope, Value};

/// Append token.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A resolved slot: `root` + `cursor` locate the container, `index` the
/// entry inside it.
#[derive(Debug, Clone)]
pub struct SlotRef {
    root: Rc<RefCell<Value>>,
    cursor: Vec<Segment>,
    index: Segment,
}

impl SlotRef {
    pub fn cursor(&self) -> &[Segment] {
        &self.cursor
    }

    pub fn index(&self) -> &Segment {
        &self.index
    }

    /// Concrete dotted path of the slot from the root (wildcards replaced by
    /// the index they resolved to).
    pub fn path(&self) -> String {
        self.cursor
            .iter()
            .chain(std::iter::once(&self.index))
            .map(Segment::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Current slot value; absent entries read as `Null`.
    pub fn get(&self) -> Value {
        let root = self.root.borrow();
        let mut node: &Value = &root;
        for segment in &self.cursor {
            match node.child(segment) {
                Some(child) => node = child,
                None => return Value::Null,
            }
        }
        node.child(&self.index).cloned().unwrap_or(Value::Null)
    }

    /// Absent or null.
    pub fn is_empty(&self) -> bool {
        self.get().is_null()
    }

    pub fn set(&self, value: Value) -> Result<(), PathError> {
        let mut root = self.root.borrow_mut();
        let mut node: &mut Value = &mut root;
        for segment in &self.cursor {
            node = node.child_mut(segment).ok_or(PathError::Dangling)?;
        }
        node.put(&self.index, value, &self.path())
    }
}

impl PartialEq for SlotRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.root, &other.root)
            && self.cursor == other.cursor
            && self.index == other.index
    }
}

/// Resolves `path` relative to `scope`, materializing missing containers.
pub fn resolve(path: &str, scope: &Scope) -> Result<SlotRef, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    let full = scope.full_path(path);
    let tokens: Vec<&str> = full.split('.').collect();
    let Some((last, parents)) = tokens.split_last() else {
        return Err(PathError::Empty);
    };

    let root = Rc::clone(scope.root());
    let mut cursor = Vec::with_capacity(parents.len());
    let index = {
        let mut guard = root.borrow_mut();
        let mut node: &mut Value = &mut guard;

        for (position, token) in parents.iter().enumerate() {
            if *token == WILDCARD {
                continue;
            }
            let segment = segment_for(node, token, &full)?;
            let next_is_wildcard = tokens.get(position + 1) == Some(&WILDCARD);
            if node.child(&segment).map_or(true, Value::is_null) {
                let fresh = if next_is_wildcard {
                    Value::List(Vec::new())
                } else {
                    Value::map()
                };
                node.put(&segment, fresh, &full)?;
            }
            node = node.child_mut(&segment).ok_or(PathError::Dangling)?;
            cursor.push(segment);
        }

        if *last == WILDCARD {
            match node {
                Value::List(items) => Segment::Index(items.len()),
                _ => return Err(PathError::NotASequence { path: full }),
            }
        } else {
            segment_for(node, last, &full)?
        }
    };

    Ok(SlotRef {
        root,
        cursor,
        index,
    })
}

/// Resolve-then-read.
pub fn get_value_from_path(path: &str, scope: &Scope) -> Result<Value, PathError> {
    Ok(resolve(path, scope)?.get())
}

fn segment_for(container: &Value, token: &str, path: &str) -> Result<Segment, PathError> {
    match container {
        Value::Map(_) => Ok(Segment::Key(token.to_string())),
        Value::List(_) => token
            .parse::<usize>()
            .map(Segment::Index)
            .map_err(|_| PathError::InvalidIndex {
                path: path.to_string(),
                segment: token.to_string(),
            }),
        _ => Err(PathError::NotAContainer {
            path: path.to_string(),
            segment: token.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope(json: serde_json::Value) -> Scope {
        Scope::new(Value::from(json))
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let scope = scope(json!({"cart": {"items": []}}));
        let first = resolve("cart.items.*", &scope).unwrap();
        let second = resolve("cart.items.*", &scope).unwrap();
        assert_eq!(first, second);

        let a = resolve("user.name", &scope).unwrap();
        let b = resolve("user.name", &scope).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_wildcard_append_grows_sequence() {
        let scope = scope(json!({"items": ["a", "b"]}));
        let slot = resolve("items.*", &scope).unwrap();
        assert_eq!(slot.index(), &Segment::Index(2));

        slot.set(Value::from("c")).unwrap();
        assert_eq!(get_value_from_path("items.*", &scope).unwrap(), Value::Null);
        assert_eq!(
            resolve("items.*", &scope).unwrap().index(),
            &Segment::Index(3)
        );
        assert_eq!(
            get_value_from_path("items", &scope).unwrap(),
            Value::from(json!(["a", "b", "c"]))
        );
    }

    #[test]
    fn test_missing_intermediates_are_materialized() {
        let scope = scope(json!({"a": null}));
        let slot = resolve("a.b.list.*", &scope).unwrap();
        slot.set(Value::from(1)).unwrap();

        assert_eq!(
            scope.snapshot().to_json(),
            json!({"a": {"b": {"list": [1]}}})
        );
    }

    #[test]
    fn test_intermediate_wildcard_is_a_marker() {
        let scope = scope(json!({}));
        let slot = resolve("rows.*.0", &scope).unwrap();
        assert_eq!(slot.cursor(), &[Segment::Key("rows".into())]);
        assert_eq!(slot.index(), &Segment::Index(0));
        assert_eq!(
            get_value_from_path("rows", &scope).unwrap(),
            Value::List(vec![])
        );
    }

    #[test]
    fn test_structure_conflicts_are_errors() {
        let scope = scope(json!({"name": "x", "items": [], "m": {}}));
        assert!(matches!(
            resolve("name.first", &scope),
            Err(PathError::NotAContainer { .. })
        ));
        assert!(matches!(
            resolve("items.first", &scope),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            resolve("m.*", &scope),
            Err(PathError::NotASequence { .. })
        ));
        assert_eq!(resolve("", &scope), Err(PathError::Empty));
    }

    #[test]
    fn test_writes_past_sequence_end_are_rejected() {
        let scope = scope(json!({"items": []}));
        let huge = resolve("items.18446744073709551615", &scope).unwrap();
        assert_eq!(huge.get(), Value::Null);
        assert!(matches!(
            huge.set(Value::from("x")),
            Err(PathError::IndexOutOfRange { len: 0, .. })
        ));
        assert!(matches!(
            resolve("items.100000000.name", &scope),
            Err(PathError::IndexOutOfRange { index: 100000000, .. })
        ));
        assert_eq!(scope.snapshot().to_json(), json!({"items": []}));

        resolve("items.0", &scope).unwrap().set(Value::from("a")).unwrap();
        assert_eq!(scope.snapshot().to_json(), json!({"items": ["a"]}));
    }

    #[test]
    fn test_slot_path_reports_concrete_indices() {
        let scope = scope(json!({"items": [1]}));
        let slot = resolve("items.*", &scope).unwrap();
        assert_eq!(slot.path(), "items.1");
    }
}
