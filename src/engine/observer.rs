// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::AttributeNames;
use crate::dom::{Document, Mutation, NodeId};

/// Work derived from one batch of document mutations.
#[derive(Debug, Default, PartialEq)]
pub struct ObservedBatch {
    /// Added elements carrying bind/toggle/action attributes
    pub attach: Vec<NodeId>,
    /// Fragment mounts to load, in discovery order
    pub loads: Vec<NodeId>,
    /// Roots of removed subtrees
    pub removed: Vec<NodeId>,
}

/// Turns `Added`/`Removed` records into attach, load and detach work.
pub struct TreeObserver {
    load: String,
    processed: [String; 3],
}

impl TreeObserver {
    pub fn new(attributes: &AttributeNames) -> Self {
        Self {
            load: attributes.load.clone(),
            processed: [
                attributes.bind.clone(),
                attributes.toggle.clone(),
                attributes.action.clone(),
            ],
        }
    }

    /// Classifies a mutation batch against the current document.
    ///
    /// An added element with the load attribute is a mount. Otherwise, when
    /// it carries a processor attribute it is attached directly, and its
    /// descendants are searched for mounts. Bind, toggle and action
    /// attributes deeper inside new subtrees are left to the next
    /// re-synchronization pass. Nodes that were added and removed again
    /// within the batch are ignored.
    pub fn observe(&self, document: &Document, mutations: &[Mutation]) -> ObservedBatch {
        let mut batch = ObservedBatch::default();
        for mutation in mutations {
            match *mutation {
                Mutation::Added(node) => self.added(document, node, &mut batch),
                Mutation::Removed { node, .. } => batch.removed.push(node),
            }
        }
        batch
    }

    fn added(&self, document: &Document, node: NodeId, batch: &mut ObservedBatch) {
        if !document.is_element(node) || !document.is_connected(node) {
            return;
        }
        if document.has_attribute(node, &self.load) {
            push_unique(&mut batch.loads, node);
            return;
        }
        if self
            .processed
            .iter()
            .any(|attribute| document.has_attribute(node, attribute))
        {
            push_unique(&mut batch.attach, node);
        }
        for mount in document.query_attribute(node, &self.load) {
            push_unique(&mut batch.loads, mount);
        }
    }
}

fn push_unique(list: &mut Vec<NodeId>, node: NodeId) {
    if !list.contains(&node) {
        list.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer() -> TreeObserver {
        TreeObserver::new(&AttributeNames::default())
    }

    #[test]
    fn test_classifies_added_elements() {
        let mut document = Document::parse("<main></main>").unwrap();
        let main = document.children(document.body())[0];
        document.take_mutations();

        document
            .set_inner_html(
                main,
                r#"<div data-load="tile"></div><button data-toggle="x"><i data-bind="y"></i></button><section><p data-bind="z"></p><div data-load="nested"></div></section>text"#,
            )
            .unwrap();
        let children = document.children(main).to_vec();
        let nested = document.query_attribute(children[2], "data-load")[0];

        let mutations = document.take_mutations();
        let batch = observer().observe(&document, &mutations);
        assert_eq!(batch.loads, vec![children[0], nested]);
        assert_eq!(batch.attach, vec![children[1]]);
        assert!(batch.removed.is_empty());
    }

    #[test]
    fn test_removals_and_transient_additions() {
        let mut document = Document::parse(r#"<div id="a"></div>"#).unwrap();
        let body = document.body();
        let a = document.children(body)[0];
        document.take_mutations();

        let transient = document.create_element("div");
        document.set_attribute(transient, "data-load", "x").unwrap();
        document.append_child(body, transient).unwrap();
        document.remove(transient).unwrap();
        document.remove(a).unwrap();

        let mutations = document.take_mutations();
        let batch = observer().observe(&document, &mutations);
        assert!(batch.loads.is_empty());
        assert_eq!(batch.removed, vec![transient, a]);
    }
}
