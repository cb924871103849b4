// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod fragment;
pub mod processor;
pub mod source;

pub use fragment::{FragmentCompiler, FragmentModule, Require};
pub use processor::{AttributeProcessor, EventResponse};
pub use source::FragmentSource;
