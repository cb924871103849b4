// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod binding;
mod config;
mod dom;
mod fragment;
mod store;

pub use binding::{BindingError, ContextError};
pub use config::{ConfigError, ValidationError};
pub use dom::DomError;
pub use fragment::{CompileError, FetchError, LoadError, RenderError};
pub use store::PathError;
