// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Template fragment backend.
//!
//! A small interpreter for mustache-style templates. Templates can only read
//! the data handed to `render` and reach other fragments through the
//! nested-loader placeholder, so they need no sandbox of their own.
//!
//! ```
//! use soulbind::backends::template::TemplateCompiler;
//! use soulbind::traits::{FragmentCompiler, Require};
//!
//! let require = Require::new("cards/card.frag", "data-load", "data-context");
//! let fragment = TemplateCompiler::new()
//!     .compile("cards/card.frag", b"<h2>{{title}}</h2>", require)
//!     .unwrap();
//! let html = fragment.render(&serde_json::json!({"title": "Hi"})).unwrap();
//! assert_eq!(html, "<h2>Hi</h2>");
//! ```

mod compiler;
mod module;
pub mod parser;

pub use compiler::TemplateCompiler;
pub use module::TemplateFragment;
