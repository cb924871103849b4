// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::binding::ProcessorEnv;
use crate::dom::NodeId;
use crate::engine::ChangeNotification;

/// What a handler did in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventResponse {
    pub notification: ChangeNotification,
    /// The handler suppresses the event's default behaviour.
    pub prevent_default: bool,
}

/// One attribute of the binding protocol.
///
/// A processor owns a side table keyed by node id: the set of elements it
/// has already processed plus whatever per-element state its handlers need.
/// Attaching is idempotent; an element is marked processed before anything
/// else happens, so a skipped element stays skipped.
pub trait AttributeProcessor {
    fn name(&self) -> &'static str;

    /// The attribute this processor reacts to.
    fn attribute(&self) -> &str;

    /// Attaches to one element. Returns `true` when a handler or binding was
    /// recorded.
    fn attach(&mut self, env: &mut ProcessorEnv<'_>, node: NodeId) -> bool;

    /// Runs the element's handler for `event`, if it has one.
    fn handle_event(
        &mut self,
        env: &mut ProcessorEnv<'_>,
        node: NodeId,
        event: &str,
    ) -> Option<EventResponse>;

    /// Drops every side-table entry for `ids`.
    fn forget(&mut self, ids: &[NodeId]);

    /// Attaches to every descendant of `root` carrying the attribute.
    fn scan(&mut self, env: &mut ProcessorEnv<'_>, root: NodeId) -> usize {
        let candidates = env.document.query_attribute(root, self.attribute());
        candidates
            .into_iter()
            .filter(|&node| self.attach(env, node))
            .count()
    }
}
