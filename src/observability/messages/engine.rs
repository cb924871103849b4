// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the engine loop.
//!
//! This module contains message types for logging events related to:
//! * Engine start-up
//! * Change notifications and re-synchronization passes
//! * Tree mutation batches and event dispatch

use crate::dom::NodeId;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Engine finished its initial scan of the document.
///
/// # Log Level
/// `info!` - Lifecycle event
///
/// # Example
/// ```
/// use soulbind::observability::messages::engine::EngineStarted;
///
/// let msg = EngineStarted {
///     bindings: 12,
///     pending_loads: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct EngineStarted {
    pub bindings: usize,
    pub pending_loads: usize,
}

impl Display for EngineStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Engine started: {} bindings attached, {} fragment loads pending",
            self.bindings, self.pending_loads
        )
    }
}

impl StructuredLog for EngineStarted {
    fn log(&self) {
        tracing::info!(
            bindings = self.bindings,
            pending_loads = self.pending_loads,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "engine_started",
            span_name = name,
            bindings = self.bindings,
            pending_loads = self.pending_loads,
        )
    }
}

/// A change notification is being delivered.
///
/// # Log Level
/// `debug!` - One per publish
pub struct ChangePublished<'a> {
    pub path: Option<&'a str>,
    pub subscribers: usize,
}

impl Display for ChangePublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Publishing change at '{}' to {} subscribers",
            self.path.unwrap_or("*"),
            self.subscribers
        )
    }
}

impl StructuredLog for ChangePublished<'_> {
    fn log(&self) {
        tracing::debug!(
            path = self.path,
            subscribers = self.subscribers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "change_published",
            span_name = name,
            path = self.path,
            subscribers = self.subscribers,
        )
    }
}

/// A re-synchronization pass finished.
///
/// # Log Level
/// `debug!` - One per change notification
pub struct ResyncCompleted {
    pub refreshed: usize,
    pub rendered: usize,
    pub pruned: usize,
    pub duration: std::time::Duration,
}

impl Display for ResyncCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Re-synchronized: {} bindings refreshed, {} fragments rendered, {} pruned in {:?}",
            self.refreshed, self.rendered, self.pruned, self.duration
        )
    }
}

impl StructuredLog for ResyncCompleted {
    fn log(&self) {
        tracing::debug!(
            refreshed = self.refreshed,
            rendered = self.rendered,
            pruned = self.pruned,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "resync",
            span_name = name,
            refreshed = self.refreshed,
            rendered = self.rendered,
            pruned = self.pruned,
        )
    }
}

/// A batch of tree mutations was classified.
///
/// # Log Level
/// `debug!` - One per batch
pub struct MutationsProcessed {
    pub added: usize,
    pub removed: usize,
    pub queued_loads: usize,
    pub released: usize,
}

impl Display for MutationsProcessed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processed mutations: {} added, {} removed, {} loads queued, {} nodes released",
            self.added, self.removed, self.queued_loads, self.released
        )
    }
}

impl StructuredLog for MutationsProcessed {
    fn log(&self) {
        tracing::debug!(
            added = self.added,
            removed = self.removed,
            queued_loads = self.queued_loads,
            released = self.released,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "mutations",
            span_name = name,
            added = self.added,
            removed = self.removed,
        )
    }
}

pub struct EventDispatched<'a> {
    pub node: NodeId,
    pub event: &'a str,
    pub handlers: usize,
}

impl Display for EventDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatched '{}' on {} to {} handlers",
            self.event, self.node, self.handlers
        )
    }
}

impl StructuredLog for EventDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            node = %self.node,
            event = self.event,
            handlers = self.handlers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "event",
            span_name = name,
            node = %self.node,
            event = self.event,
        )
    }
}
