// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashSet};

use crate::binding::attributes::{is_form_control, BindSpec, CHANGE_EVENT};
use crate::binding::{skipped, ProcessorEnv};
use crate::dom::{Document, NodeId};
use crate::engine::ChangeNotification;
use crate::errors::BindingError;
use crate::observability::messages::binding::{BindingRefreshed, ProcessorAttached};
use crate::observability::messages::StructuredLog;
use crate::store::{Invocation, Scope, Value};
use crate::traits::{AttributeProcessor, EventResponse};

#[derive(Debug)]
struct Binding {
    property: String,
    path: String,
    scope: Scope,
    form_control: bool,
}

impl Binding {
    /// The slot's value for display: computed cells are called with
    /// `(element, context)`.
    fn display_value(&self, node: NodeId) -> Result<Value, BindingError> {
        let value = self.scope.get(&self.path)?;
        Ok(match value {
            Value::Computed(cell) => cell.call(&Invocation::display(node, &self.scope)),
            other => other,
        })
    }
}

/// Two-way value binding: `[property:]path`.
pub struct BindProcessor {
    attribute: String,
    processed: HashSet<NodeId>,
    bindings: BTreeMap<NodeId, Binding>,
}

impl BindProcessor {
    pub fn new(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            processed: HashSet::new(),
            bindings: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn is_bound(&self, node: NodeId) -> bool {
        self.bindings.contains_key(&node)
    }

    fn try_attach(&mut self, env: &mut ProcessorEnv<'_>, node: NodeId) -> Result<bool, BindingError> {
        let document = &mut *env.document;
        if document.has_attribute(node, env.load_attribute) {
            return Ok(false);
        }
        let Some(raw) = document.get_attribute(node, &self.attribute) else {
            return Ok(false);
        };
        let tag = document.tag_name(node).unwrap_or_default();
        let spec = BindSpec::parse(raw, tag);
        let form_control = is_form_control(tag);

        let scope = env.contexts.resolve(document, node, env.store)?;
        let binding = Binding {
            property: spec.property,
            path: spec.path,
            scope,
            form_control,
        };

        let slot = binding.scope.resolve(&binding.path)?;
        if slot.is_empty() {
            // an append slot is always empty, so attaching appends
            let current = document.get_property(node, &binding.property)?;
            slot.set(Value::String(current))?;
        } else {
            let text = binding.display_value(node)?.to_display_string();
            document.set_property(node, &binding.property, &text)?;
        }

        ProcessorAttached {
            processor: self.name(),
            node,
            attribute: &binding.path,
        }
        .log();
        self.bindings.insert(node, binding);
        Ok(true)
    }

    /// Re-synchronizes every bound element.
    ///
    /// Connected elements get their property overwritten when the slot's
    /// value is defined and differs; bindings of disconnected elements are
    /// dropped. Returns the number of properties written.
    pub fn refresh(&mut self, document: &mut Document) -> usize {
        self.bindings.retain(|&node, _| document.is_connected(node));

        let mut written = 0;
        for (&node, binding) in &self.bindings {
            let value = match binding.display_value(node) {
                Ok(value) => value,
                Err(error) => {
                    skipped("bind", node, &error);
                    continue;
                }
            };
            if value.is_null() {
                continue;
            }
            let text = value.to_display_string();
            if document
                .get_property(node, &binding.property)
                .is_ok_and(|current| current == text)
            {
                continue;
            }
            if let Err(error) = document.set_property(node, &binding.property, &text) {
                skipped("bind", node, &error);
                continue;
            }
            BindingRefreshed {
                node,
                property: &binding.property,
                path: &binding.path,
            }
            .log();
            written += 1;
        }
        written
    }

    /// Form-control write-back on `change`.
    fn write_back(
        &self,
        document: &Document,
        node: NodeId,
        binding: &Binding,
    ) -> Result<ChangeNotification, BindingError> {
        let new_value = Value::String(document.get_property(node, &binding.property)?);
        // Append paths re-resolve here, so each change lands at the next index.
        let slot = binding.scope.resolve(&binding.path)?;
        match slot.get() {
            Value::Computed(cell) => {
                cell.call(&Invocation::write(node, &binding.scope, new_value.clone()));
            }
            _ => slot.set(new_value.clone())?,
        }
        Ok(ChangeNotification::new(Some(new_value), Some(binding.path.clone())))
    }
}

impl AttributeProcessor for BindProcessor {
    fn name(&self) -> &'static str {
        "bind"
    }

    fn attribute(&self) -> &str {
        &self.attribute
    }

    fn attach(&mut self, env: &mut ProcessorEnv<'_>, node: NodeId) -> bool {
        if !self.processed.insert(node) {
            return false;
        }
        match self.try_attach(env, node) {
            Ok(attached) => attached,
            Err(error) => {
                skipped(self.name(), node, &error);
                false
            }
        }
    }

    fn handle_event(
        &mut self,
        env: &mut ProcessorEnv<'_>,
        node: NodeId,
        event: &str,
    ) -> Option<EventResponse> {
        if event != CHANGE_EVENT {
            return None;
        }
        let binding = self.bindings.get(&node).filter(|b| b.form_control)?;
        let notification = match self.write_back(env.document, node, binding) {
            Ok(notification) => notification,
            Err(error) => {
                skipped(self.name(), node, &error);
                ChangeNotification::new(None, Some(binding.path.clone()))
            }
        };
        Some(EventResponse {
            notification,
            prevent_default: false,
        })
    }

    fn forget(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.processed.remove(id);
            self.bindings.remove(id);
        }
    }
}
