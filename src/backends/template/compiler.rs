// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::rc::Rc;

use crate::backends::template::module::TemplateFragment;
use crate::backends::template::parser::parse;
use crate::backends::wasm::has_wasm_magic;
use crate::errors::CompileError;
use crate::traits::{FragmentCompiler, FragmentModule, Require};

/// Compiles UTF-8 template text into [`TemplateFragment`]s.
///
/// Registered after the WASM compiler: anything that is not a WASM binary
/// and decodes as UTF-8 is treated as a template.
#[derive(Debug, Default)]
pub struct TemplateCompiler;

impl TemplateCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl FragmentCompiler for TemplateCompiler {
    fn name(&self) -> &'static str {
        "template"
    }

    fn accepts(&self, bytes: &[u8]) -> bool {
        !has_wasm_magic(bytes) && std::str::from_utf8(bytes).is_ok()
    }

    fn compile(
        &self,
        _identifier: &str,
        bytes: &[u8],
        require: Require,
    ) -> Result<Rc<dyn FragmentModule>, CompileError> {
        let source = String::from_utf8(bytes.to_vec())?;
        let template = parse(&source)?;
        Ok(Rc::new(TemplateFragment::new(template, require)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn require() -> Require {
        Require::new("tile.frag", "data-load", "data-context")
    }

    #[test]
    fn test_accepts_text_but_not_wasm_or_binary() {
        let compiler = TemplateCompiler::new();
        assert!(compiler.accepts(b"<p>{{name}}</p>"));
        assert!(!compiler.accepts(b"\0asm\x01\0\0\0"));
        assert!(!compiler.accepts(&[0xff, 0xfe, 0x00]));
    }

    #[test]
    fn test_compile_and_render() {
        let fragment = TemplateCompiler::new()
            .compile("tile.frag", b"<p>{{name}}</p>", require())
            .unwrap();
        assert_eq!(fragment.render(&json!({"name": "Tile"})).unwrap(), "<p>Tile</p>");
    }

    #[test]
    fn test_syntax_errors_surface() {
        let result = TemplateCompiler::new().compile("tile.frag", b"{{#each x}}", require());
        assert!(matches!(result, Err(CompileError::Syntax { .. })));
    }

    #[test]
    fn test_invalid_utf8_is_a_compile_error() {
        let result = TemplateCompiler::new().compile("tile.frag", &[0xff, 0xfe], require());
        assert!(matches!(result, Err(CompileError::Utf8(_))));
    }
}
