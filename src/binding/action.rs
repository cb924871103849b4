// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use crate::binding::attributes::ActionSpec;
use crate::binding::{skipped, ProcessorEnv};
use crate::dom::NodeId;
use crate::engine::ChangeNotification;
use crate::errors::BindingError;
use crate::observability::messages::binding::{ActionInert, ProcessorAttached};
use crate::observability::messages::StructuredLog;
use crate::store::{Computed, Invocation, Scope, Value};
use crate::traits::{AttributeProcessor, EventResponse};

#[derive(Debug)]
struct Action {
    event: String,
    /// Captured when the element was attached.
    function: Computed,
    parameter: Option<String>,
    scope: Scope,
}

/// Function dispatch: `trigger:functionPath:parameterPath`.
///
/// The function path must hold a [`Computed`] cell when the element is
/// attached; otherwise the element stays inert.
pub struct ActionProcessor {
    attribute: String,
    processed: HashSet<NodeId>,
    actions: HashMap<NodeId, Action>,
}

impl ActionProcessor {
    pub fn new(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            processed: HashSet::new(),
            actions: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn try_attach(&mut self, env: &mut ProcessorEnv<'_>, node: NodeId) -> Result<bool, BindingError> {
        let Some(raw) = env.document.get_attribute(node, &self.attribute) else {
            return Ok(false);
        };
        let spec = ActionSpec::parse(raw);
        let scope = env.contexts.resolve(env.document, node, env.store)?;

        let Value::Computed(function) = scope.get(&spec.function)? else {
            ActionInert {
                node,
                function_path: &spec.function,
            }
            .log();
            return Ok(false);
        };

        ProcessorAttached {
            processor: self.name(),
            node,
            attribute: &spec.function,
        }
        .log();
        self.actions.insert(
            node,
            Action {
                event: spec.event,
                function,
                parameter: spec.parameter,
                scope,
            },
        );
        Ok(true)
    }
}

impl AttributeProcessor for ActionProcessor {
    fn name(&self) -> &'static str {
        "action"
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
        _env: &mut ProcessorEnv<'_>,
        node: NodeId,
        event: &str,
    ) -> Option<EventResponse> {
        let action = self.actions.get(&node).filter(|a| a.event == event)?;
        let argument = match action.parameter.as_deref() {
            Some(path) => match action.scope.get(path) {
                Ok(value) => Some(value),
                Err(error) => {
                    skipped(self.name(), node, &error);
                    None
                }
            },
            None => None,
        };
        action.function.call(&Invocation {
            element: node,
            context: &action.scope,
            argument,
            parameter_path: action.parameter.as_deref(),
        });
        Some(EventResponse {
            notification: ChangeNotification::new(None, None),
            prevent_default: true,
        })
    }

    fn forget(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.processed.remove(id);
            self.actions.remove(id);
        }
    }
}
