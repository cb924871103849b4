// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Store values.
//!
//! A store slot holds either plain JSON-shaped data or a [`Computed`] cell.
//! The processors branch on the tag instead of probing values at run time:
//! a computed cell is *called* for display, write-back and actions, plain
//! data is read and written directly.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Number;

use crate::dom::NodeId;
use crate::errors::PathError;
use crate::store::path::Segment;
use crate::store::Scope;

/// Arguments handed to a computed cell.
///
/// * display: `argument` is `None`
/// * write-back: `argument` is the new property value
/// * action: `argument` is the resolved parameter (if any) and
///   `parameter_path` the raw parameter token
pub struct Invocation<'a> {
    pub element: NodeId,
    pub context: &'a Scope,
    pub argument: Option<Value>,
    pub parameter_path: Option<&'a str>,
}

impl<'a> Invocation<'a> {
    pub fn display(element: NodeId, context: &'a Scope) -> Self {
        Self {
            element,
            context,
            argument: None,
            parameter_path: None,
        }
    }

    pub fn write(element: NodeId, context: &'a Scope, value: Value) -> Self {
        Self {
            element,
            context,
            argument: Some(value),
            parameter_path: None,
        }
    }
}

/// A callable store cell.
#[derive(Clone)]
pub struct Computed(Rc<dyn Fn(&Invocation<'_>) -> Value>);

impl Computed {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Value + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, invocation: &Invocation<'_>) -> Value {
        (self.0)(invocation)
    }

    pub fn ptr_eq(&self, other: &Computed) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Computed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Computed(..)")
    }
}

/// A store value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Computed(Computed),
}

impl Value {
    /// An empty mapping.
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Value + 'static,
    {
        Value::Computed(Computed::new(f))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// JavaScript-style truthiness, used by toggles and template conditionals.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Computed(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_computed(&self) -> Option<&Computed> {
        match self {
            Value::Computed(c) => Some(c),
            _ => None,
        }
    }

    /// Text written into an element property. `Null` renders as `""`.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::List(_) | Value::Map(_) => self.to_json().to_string(),
            Value::Computed(_) => String::new(),
        }
    }

    /// JSON snapshot handed to fragment modules. Computed cells do not
    /// cross the sandbox boundary: they are dropped from mappings and become
    /// `null` inside sequences.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Computed(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .filter(|(_, v)| !matches!(v, Value::Computed(_)))
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    pub(crate) fn child(&self, segment: &Segment) -> Option<&Value> {
        match (self, segment) {
            (Value::Map(entries), Segment::Key(key)) => entries.get(key),
            (Value::List(items), Segment::Index(i)) => items.get(*i),
            _ => None,
        }
    }

    pub(crate) fn child_mut(&mut self, segment: &Segment) -> Option<&mut Value> {
        match (self, segment) {
            (Value::Map(entries), Segment::Key(key)) => entries.get_mut(key),
            (Value::List(items), Segment::Index(i)) => items.get_mut(*i),
            _ => None,
        }
    }

    /// Writes `value` at `segment`. Writing at the length of a sequence
    /// appends; sequences are never padded, so indices further out are
    /// rejected.
    pub(crate) fn put(&mut self, segment: &Segment, value: Value, path: &str) -> Result<(), PathError> {
        match (self, segment) {
            (Value::Map(entries), Segment::Key(key)) => {
                entries.insert(key.clone(), value);
                Ok(())
            }
            (Value::List(items), Segment::Index(i)) => match (*i).cmp(&items.len()) {
                Ordering::Less => {
                    items[*i] = value;
                    Ok(())
                }
                Ordering::Equal => {
                    items.push(value);
                    Ok(())
                }
                Ordering::Greater => Err(PathError::IndexOutOfRange {
                    path: path.to_string(),
                    index: *i,
                    len: items.len(),
                }),
            },
            _ => Err(PathError::NotAContainer {
                path: path.to_string(),
                segment: segment.to_string(),
            }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Computed(a), Value::Computed(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
