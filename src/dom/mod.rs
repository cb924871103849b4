// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The document tree the engine binds against.

mod document;
pub mod markup;

pub use document::{Document, Mutation, NodeId};
