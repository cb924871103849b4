// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the bind, toggle and action processors.

use crate::dom::NodeId;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A processor attached behaviour to an element.
///
/// # Log Level
/// `debug!` - Per-element detail
pub struct ProcessorAttached<'a> {
    pub processor: &'a str,
    pub node: NodeId,
    pub attribute: &'a str,
}

impl Display for ProcessorAttached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} processor attached to {} ({})",
            self.processor, self.node, self.attribute
        )
    }
}

impl StructuredLog for ProcessorAttached<'_> {
    fn log(&self) {
        tracing::debug!(
            processor = self.processor,
            node = %self.node,
            attribute = self.attribute,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "processor_attached",
            span_name = name,
            processor = self.processor,
            node = %self.node,
        )
    }
}

/// Attaching to an element failed; the element stays marked and inert.
///
/// # Log Level
/// `warn!` - The element will never be bound
pub struct BindingSkipped<'a> {
    pub processor: &'a str,
    pub node: NodeId,
    pub error: &'a dyn std::error::Error,
}

impl Display for BindingSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} processor skipped {}: {}",
            self.processor, self.node, self.error
        )
    }
}

impl StructuredLog for BindingSkipped<'_> {
    fn log(&self) {
        tracing::warn!(
            processor = self.processor,
            node = %self.node,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "binding_skipped",
            span_name = name,
            processor = self.processor,
            node = %self.node,
        )
    }
}

/// The function path of an action does not hold a computed cell.
///
/// # Log Level
/// `debug!` - Expected for actions whose functions are registered later
pub struct ActionInert<'a> {
    pub node: NodeId,
    pub function_path: &'a str,
}

impl Display for ActionInert<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Action on {} is inert: '{}' is not callable",
            self.node, self.function_path
        )
    }
}

impl StructuredLog for ActionInert<'_> {
    fn log(&self) {
        tracing::debug!(
            node = %self.node,
            function_path = self.function_path,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "action_inert",
            span_name = name,
            node = %self.node,
            function_path = self.function_path,
        )
    }
}

pub struct BindingRefreshed<'a> {
    pub node: NodeId,
    pub property: &'a str,
    pub path: &'a str,
}

impl Display for BindingRefreshed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Refreshed {}.{} from '{}'",
            self.node, self.property, self.path
        )
    }
}

impl StructuredLog for BindingRefreshed<'_> {
    fn log(&self) {
        tracing::debug!(
            node = %self.node,
            property = self.property,
            path = self.path,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "binding_refreshed",
            span_name = name,
            node = %self.node,
            path = self.path,
        )
    }
}
