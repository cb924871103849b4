// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{DomError, PathError};
use thiserror::Error;

/// A literal context attribute could not be turned into a scope.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("invalid context literal: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Attaching a processor to one element failed.
///
/// The element keeps its processed mark, so the failure is reported once and
/// the element is left inert.
#[derive(Error, Debug)]
pub enum BindingError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Dom(#[from] DomError),
}
