// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while resolving dotted paths against a store scope.

use thiserror::Error;

/// A path could not be resolved or written against the current store shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("empty path")]
    Empty,

    /// Traversal reached a value that cannot hold children.
    #[error("cannot descend into '{segment}' of path '{path}': value is not a mapping or sequence")]
    NotAContainer { path: String, segment: String },

    /// A non-numeric key was used against a sequence.
    #[error("segment '{segment}' of path '{path}' is not a valid sequence index")]
    InvalidIndex { path: String, segment: String },

    /// The wildcard append token was used against something that is not a sequence.
    #[error("path '{path}' appends with '*' but the target is not a sequence")]
    NotASequence { path: String },

    /// A write addressed a sequence index past its append position.
    #[error("index {index} of path '{path}' is past the end of a sequence of length {len}")]
    IndexOutOfRange { path: String, index: usize, len: usize },

    /// The container a slot reference points into no longer exists.
    #[error("slot container is gone; the store was reshaped after resolution")]
    Dangling,
}
