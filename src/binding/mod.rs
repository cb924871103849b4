// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The declarative attribute protocol.
//!
//! Three processors attach live behaviour to elements:
//!
//! | Attribute     | Grammar                                  | Processor           |
//! |---------------|------------------------------------------|---------------------|
//! | `data-bind`   | `[property:]path`                        | [`BindProcessor`]   |
//! | `data-toggle` | `[trigger:]path`                         | [`ToggleProcessor`] |
//! | `data-action` | `trigger:functionPath:parameterPath`     | [`ActionProcessor`] |
//!
//! Paths resolve against the element's context ([`ContextTable`]): its own
//! `data-context` literal, else the nearest fragment mount's context, else
//! the store. [`Bindings`] owns the three processors and the context table
//! and is what the engine drives.

pub mod action;
pub mod attributes;
pub mod bind;
pub mod context;
pub mod toggle;

pub use action::ActionProcessor;
pub use bind::BindProcessor;
pub use context::ContextTable;
pub use toggle::ToggleProcessor;

use crate::config::AttributeNames;
use crate::dom::{Document, NodeId};
use crate::observability::messages::binding::BindingSkipped;
use crate::observability::messages::StructuredLog;
use crate::store::Store;
use crate::traits::{AttributeProcessor, EventResponse};

/// Everything a processor needs while attaching or handling an event.
pub struct ProcessorEnv<'a> {
    pub document: &'a mut Document,
    pub store: &'a Store,
    pub contexts: &'a mut ContextTable,
    /// Elements carrying this attribute are fragment mounts.
    pub load_attribute: &'a str,
}

pub(crate) fn skipped(processor: &str, node: NodeId, error: &dyn std::error::Error) {
    BindingSkipped {
        processor,
        node,
        error,
    }
    .log();
}

/// Handlers that ran for one dispatched event, in processor order.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub responses: Vec<EventResponse>,
}

impl Dispatch {
    pub fn default_prevented(&self) -> bool {
        self.responses.iter().any(|r| r.prevent_default)
    }
}

/// The three attribute processors plus the shared context table.
pub struct Bindings {
    load_attribute: String,
    contexts: ContextTable,
    bind: BindProcessor,
    toggle: ToggleProcessor,
    action: ActionProcessor,
}

impl Bindings {
    pub fn new(attributes: &AttributeNames) -> Self {
        Self {
            load_attribute: attributes.load.clone(),
            contexts: ContextTable::new(&attributes.context),
            bind: BindProcessor::new(&attributes.bind),
            toggle: ToggleProcessor::new(&attributes.toggle),
            action: ActionProcessor::new(&attributes.action),
        }
    }

    pub fn contexts(&self) -> &ContextTable {
        &self.contexts
    }

    pub fn contexts_mut(&mut self) -> &mut ContextTable {
        &mut self.contexts
    }

    pub fn bind(&self) -> &BindProcessor {
        &self.bind
    }

    pub fn toggle(&self) -> &ToggleProcessor {
        &self.toggle
    }

    pub fn action(&self) -> &ActionProcessor {
        &self.action
    }

    /// Total live handlers and bindings.
    pub fn len(&self) -> usize {
        self.bind.len() + self.toggle.len() + self.action.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs bind, toggle and action over the descendants of `root`.
    pub fn scan(&mut self, document: &mut Document, store: &Store, root: NodeId) -> usize {
        let mut env = ProcessorEnv {
            document,
            store,
            contexts: &mut self.contexts,
            load_attribute: &self.load_attribute,
        };
        self.bind.scan(&mut env, root)
            + self.toggle.scan(&mut env, root)
            + self.action.scan(&mut env, root)
    }

    /// Runs only the processors whose attribute `node` itself carries.
    pub fn attach(&mut self, document: &mut Document, store: &Store, node: NodeId) -> usize {
        let mut env = ProcessorEnv {
            document,
            store,
            contexts: &mut self.contexts,
            load_attribute: &self.load_attribute,
        };
        let processors: [&mut dyn AttributeProcessor; 3] =
            [&mut self.bind, &mut self.toggle, &mut self.action];
        let mut attached = 0;
        for processor in processors {
            if env.document.has_attribute(node, processor.attribute())
                && processor.attach(&mut env, node)
            {
                attached += 1;
            }
        }
        attached
    }

    /// Overwrites bound properties whose slot changed.
    pub fn refresh(&mut self, document: &mut Document) -> usize {
        self.bind.refresh(document)
    }

    /// Delivers `event` to every handler registered for `node`.
    ///
    /// Events do not bubble: only handlers on `node` itself run.
    pub fn dispatch(
        &mut self,
        document: &mut Document,
        store: &Store,
        node: NodeId,
        event: &str,
    ) -> Dispatch {
        let mut env = ProcessorEnv {
            document,
            store,
            contexts: &mut self.contexts,
            load_attribute: &self.load_attribute,
        };
        let processors: [&mut dyn AttributeProcessor; 3] =
            [&mut self.bind, &mut self.toggle, &mut self.action];
        Dispatch {
            responses: processors
                .into_iter()
                .filter_map(|p| p.handle_event(&mut env, node, event))
                .collect(),
        }
    }

    pub fn forget(&mut self, ids: &[NodeId]) {
        self.bind.forget(ids);
        self.toggle.forget(ids);
        self.action.forget(ids);
        self.contexts.forget(ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Value;
    use serde_json::json;

    #[test]
    fn test_scan_attaches_all_three_processors() {
        let mut document = Document::parse(
            r#"<p data-bind="count"></p><button data-toggle="open"></button><a data-action="go"></a>"#,
        )
        .unwrap();
        let store = Store::from_json(json!({"count": 2}));
        store.set("go", Value::computed(|_| Value::Null)).unwrap();
        let mut bindings = Bindings::new(&AttributeNames::default());

        let body = document.body();
        assert_eq!(bindings.scan(&mut document, &store, body), 3);
        assert_eq!(bindings.len(), 3);
        assert_eq!(bindings.scan(&mut document, &store, body), 0);
    }

    #[test]
    fn test_attach_runs_only_matching_processors() {
        let mut document =
            Document::parse(r#"<button data-toggle="open"><i data-bind="x"></i></button>"#).unwrap();
        let store = Store::new();
        let mut bindings = Bindings::new(&AttributeNames::default());
        let button = document.query_attribute(document.body(), "data-toggle")[0];

        assert_eq!(bindings.attach(&mut document, &store, button), 1);
        assert_eq!(bindings.toggle().len(), 1);
        assert!(bindings.bind().is_empty());
    }

    #[test]
    fn test_dispatch_collects_responses_in_order() {
        let mut document = Document::parse(
            r#"<button data-toggle="open" data-action="go">x</button>"#,
        )
        .unwrap();
        let store = Store::new();
        store.set("go", Value::computed(|_| Value::Null)).unwrap();
        let mut bindings = Bindings::new(&AttributeNames::default());
        let body = document.body();
        bindings.scan(&mut document, &store, body);
        let button = document.query_attribute(body, "data-toggle")[0];

        let dispatch = bindings.dispatch(&mut document, &store, button, "click");
        assert_eq!(dispatch.responses.len(), 2);
        assert_eq!(dispatch.responses[0].notification.path.as_deref(), Some("open"));
        assert_eq!(dispatch.responses[1].notification.path, None);
        assert!(dispatch.default_prevented());
    }

    #[test]
    fn test_forget_allows_reattachment() {
        let mut document = Document::parse(r#"<p data-bind="a"></p>"#).unwrap();
        let store = Store::new();
        let mut bindings = Bindings::new(&AttributeNames::default());
        let body = document.body();
        bindings.scan(&mut document, &store, body);
        let p = document.query_attribute(body, "data-bind")[0];

        bindings.forget(&[p]);
        assert!(bindings.is_empty());
        assert_eq!(bindings.scan(&mut document, &store, body), 1);
    }
}
