// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use crate::binding::attributes::{ToggleSpec, Trigger, POINTER_ENTER_EVENT, POINTER_LEAVE_EVENT};
use crate::binding::{skipped, ProcessorEnv};
use crate::dom::NodeId;
use crate::engine::ChangeNotification;
use crate::errors::BindingError;
use crate::observability::messages::binding::ProcessorAttached;
use crate::observability::messages::StructuredLog;
use crate::store::{Scope, Value};
use crate::traits::{AttributeProcessor, EventResponse};

#[derive(Debug)]
enum Behavior {
    /// Baseline captured when the element was attached.
    Hover { start: Value },
    Flip { event: String },
}

#[derive(Debug)]
struct Toggle {
    path: String,
    scope: Scope,
    behavior: Behavior,
}

/// Boolean toggling: `[trigger:]path`.
pub struct ToggleProcessor {
    attribute: String,
    processed: HashSet<NodeId>,
    toggles: HashMap<NodeId, Toggle>,
}

impl ToggleProcessor {
    pub fn new(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            processed: HashSet::new(),
            toggles: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.toggles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty()
    }

    fn try_attach(&mut self, env: &mut ProcessorEnv<'_>, node: NodeId) -> Result<bool, BindingError> {
        let Some(raw) = env.document.get_attribute(node, &self.attribute) else {
            return Ok(false);
        };
        let spec = ToggleSpec::parse(raw);
        let scope = env.contexts.resolve(env.document, node, env.store)?;
        let slot = scope.resolve(&spec.path)?;

        let behavior = match spec.trigger {
            Trigger::Hover => Behavior::Hover { start: slot.get() },
            Trigger::Event(event) => Behavior::Flip { event },
        };
        ProcessorAttached {
            processor: self.name(),
            node,
            attribute: &spec.path,
        }
        .log();
        self.toggles.insert(
            node,
            Toggle {
                path: spec.path,
                scope,
                behavior,
            },
        );
        Ok(true)
    }

    fn fire(toggle: &Toggle, event: &str) -> Result<Option<Value>, BindingError> {
        let next = match &toggle.behavior {
            Behavior::Hover { start } if event == POINTER_ENTER_EVENT => {
                Value::Bool(!start.is_truthy())
            }
            Behavior::Hover { start } if event == POINTER_LEAVE_EVENT => start.clone(),
            Behavior::Flip { event: trigger } if event == trigger.as_str() => {
                let slot = toggle.scope.resolve(&toggle.path)?;
                Value::Bool(!slot.get().is_truthy())
            }
            _ => return Ok(None),
        };
        toggle.scope.set(&toggle.path, next.clone())?;
        Ok(Some(next))
    }
}

impl AttributeProcessor for ToggleProcessor {
    fn name(&self) -> &'static str {
        "toggle"
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
        let toggle = self.toggles.get(&node)?;
        match Self::fire(toggle, event) {
            Ok(Some(value)) => Some(EventResponse {
                notification: ChangeNotification::new(Some(value), Some(toggle.path.clone())),
                prevent_default: false,
            }),
            Ok(None) => None,
            Err(error) => {
                skipped(self.name(), node, &error);
                None
            }
        }
    }

    fn forget(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.processed.remove(id);
            self.toggles.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ContextTable;
    use crate::dom::Document;
    use crate::store::Store;
    use serde_json::json;

    struct Fixture {
        document: Document,
        store: Store,
        contexts: ContextTable,
        processor: ToggleProcessor,
    }

    impl Fixture {
        fn new(markup: &str, store: serde_json::Value) -> Self {
            let mut fixture = Self {
                document: Document::parse(markup).unwrap(),
                store: Store::from_json(store),
                contexts: ContextTable::new("data-context"),
                processor: ToggleProcessor::new("data-toggle"),
            };
            let root = fixture.document.body();
            let mut env = ProcessorEnv {
                document: &mut fixture.document,
                store: &fixture.store,
                contexts: &mut fixture.contexts,
                load_attribute: "data-load",
            };
            fixture.processor.scan(&mut env, root);
            fixture
        }

        fn fire(&mut self, event: &str) -> Option<EventResponse> {
            let node = self.document.query_attribute(self.document.body(), "data-toggle")[0];
            let mut env = ProcessorEnv {
                document: &mut self.document,
                store: &self.store,
                contexts: &mut self.contexts,
                load_attribute: "data-load",
            };
            self.processor.handle_event(&mut env, node, event)
        }
    }

    #[test]
    fn test_click_flips_current_value() {
        let mut fx = Fixture::new(r#"<button data-toggle="menu.open"></button>"#, json!({"menu": {"open": false}}));
        let response = fx.fire("click").unwrap();
        assert_eq!(
            response.notification,
            ChangeNotification::new(Some(Value::Bool(true)), Some("menu.open".to_string()))
        );
        fx.fire("click");
        assert_eq!(fx.store.get("menu.open").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_flip_reads_value_at_fire_time() {
        let mut fx = Fixture::new(r#"<button data-toggle="flag"></button>"#, json!({"flag": false}));
        fx.store.set("flag", Value::Bool(true)).unwrap();
        fx.fire("click");
        assert_eq!(fx.store.get("flag").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_custom_trigger_ignores_other_events() {
        let mut fx = Fixture::new(r#"<li data-toggle="dblclick:selected"></li>"#, json!({}));
        assert!(fx.fire("click").is_none());
        fx.fire("dblclick");
        assert_eq!(fx.store.get("selected").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_hover_restores_attach_time_baseline() {
        let mut fx = Fixture::new(r#"<span data-toggle="hover:tip"></span>"#, json!({"tip": false}));
        fx.fire("mouseover");
        assert_eq!(fx.store.get("tip").unwrap(), Value::Bool(true));

        fx.store.set("tip", Value::from("changed elsewhere")).unwrap();
        let response = fx.fire("mouseout").unwrap();
        assert_eq!(response.notification.value, Some(Value::Bool(false)));
        assert_eq!(fx.store.get("tip").unwrap(), Value::Bool(false));

        fx.fire("mouseover");
        assert_eq!(fx.store.get("tip").unwrap(), Value::Bool(true));
        assert!(fx.fire("click").is_none());
    }

    #[test]
    fn test_hover_with_missing_baseline_restores_null() {
        let mut fx = Fixture::new(r#"<span data-toggle="hover:tip"></span>"#, json!({}));
        fx.fire("mouseover");
        assert_eq!(fx.store.get("tip").unwrap(), Value::Bool(true));
        fx.fire("mouseout");
        assert!(fx.store.get("tip").unwrap().is_null());
    }

    #[test]
    fn test_literal_context_is_toggled_not_store() {
        let mut fx = Fixture::new(
            r#"<span data-toggle="open" data-context='{"open":false}'></span>"#,
            json!({"open": false}),
        );
        fx.fire("click");
        assert_eq!(fx.store.get("open").unwrap(), Value::Bool(false));
        assert_eq!(fx.processor.len(), 1);
    }
}
