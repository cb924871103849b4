// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::dom::NodeId;
use thiserror::Error;

/// Document tree failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// Inserting the node would make it an ancestor of itself.
    #[error("cannot insert node {child} under {parent}: it would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("malformed markup at byte {offset}: {message}")]
    Markup { offset: usize, message: String },
}
