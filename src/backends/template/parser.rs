// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Template source parsing.
//!
//! A template is an optional leading `<style>` block followed by markup with
//! mustache-style tags:
//!
//! | Tag                          | Meaning                                  |
//! |------------------------------|------------------------------------------|
//! | `{{path}}`                   | value at `path`, HTML-escaped            |
//! | `{{{path}}}`                 | value at `path`, raw                     |
//! | `{{#if path}}`               | block when the value is truthy           |
//! | `{{#if path == "literal"}}`  | block when the value equals a JSON literal |
//! | `{{#each path}}`             | block per item, with `this` and `@index` |
//! | `{{else}}`                   | alternative branch of `#if` / `#each`    |
//! | `{{> relative [path]}}`      | nested fragment placeholder              |
//! | `{{! comment }}`             | dropped                                  |

mod lexer;

use chumsky::input::ValueInput;
use chumsky::prelude::*;

use crate::errors::CompileError;
use lexer::{Block, Tag};

/// Deepest allowed nesting of `#if` / `#each` blocks.
pub const MAX_NESTING: usize = 32;

/// A parsed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub styles: Option<String>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Value {
        path: String,
        escape: bool,
    },
    If {
        condition: Condition,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Each {
        path: String,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Partial {
        relative: String,
        path: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Truthy(String),
    Equals(String, serde_json::Value),
}

pub fn parse(source: &str) -> Result<Template, CompileError> {
    let (styles, body, body_offset) = split_styles(source)?;
    let tokens = lexer::tokenize(body, body_offset)?;
    check_nesting(&tokens)?;

    let eoi = body_offset + body.len();
    let input = tokens
        .as_slice()
        .map(SimpleSpan::from(eoi..eoi), |(tag, span)| (tag, span));
    let body = block()
        .then_ignore(end())
        .parse(input)
        .into_result()
        .map_err(|errors| match errors.first() {
            Some(error) => unexpected(error),
            None => syntax(eoi, "malformed template"),
        })?;
    Ok(Template { styles, body })
}

/// Text, values and partials, with `#if` / `#each` blocks nesting the same
/// grammar. Each block takes an optional single `{{else}}` branch and must
/// be closed by its own name.
fn block<'src, I>() -> impl Parser<'src, I, Vec<Node>, extra::Err<Rich<'src, Tag>>>
where
    I: ValueInput<'src, Token = Tag, Span = SimpleSpan>,
{
    recursive(|block| {
        let leaf = select! {
            Tag::Text(text) => Node::Text(text),
            Tag::Value { path, escape } => Node::Value { path, escape },
            Tag::Partial { relative, path } => Node::Partial { relative, path },
        };

        let otherwise = just(Tag::Else)
            .ignore_then(block.clone())
            .or_not()
            .map(Option::unwrap_or_default);

        let if_block = select! { Tag::OpenIf(condition) => condition }
            .then(block.clone())
            .then(otherwise.clone())
            .then_ignore(just(Tag::Close(Block::If)))
            .map(|((condition, then), otherwise)| Node::If {
                condition,
                then,
                otherwise,
            });

        let each_block = select! { Tag::OpenEach(path) => path }
            .then(block)
            .then(otherwise)
            .then_ignore(just(Tag::Close(Block::Each)))
            .map(|((path, body), otherwise)| Node::Each {
                path,
                body,
                otherwise,
            });

        choice((leaf, if_block, each_block))
            .repeated()
            .collect::<Vec<_>>()
    })
}

fn check_nesting(tokens: &[(Tag, SimpleSpan)]) -> Result<(), CompileError> {
    let mut depth = 0usize;
    for (tag, span) in tokens {
        match tag {
            Tag::OpenIf(_) | Tag::OpenEach(_) => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(syntax(
                        span.start,
                        &format!("blocks nest deeper than {}", MAX_NESTING),
                    ));
                }
            }
            Tag::Close(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn unexpected(error: &Rich<'_, Tag>) -> CompileError {
    match error.found() {
        Some(tag) => syntax(error.span().start, &format!("unexpected '{}'", tag)),
        None => syntax(error.span().start, "a block is never closed"),
    }
}

fn syntax(offset: usize, message: &str) -> CompileError {
    CompileError::Syntax {
        offset,
        message: message.to_string(),
    }
}

/// Splits a leading `<style>…</style>` block off the body.
fn split_styles(source: &str) -> Result<(Option<String>, &str, usize), CompileError> {
    let trimmed = source.trim_start();
    let leading = source.len() - trimmed.len();
    if !trimmed.starts_with("<style") {
        return Ok((None, source, 0));
    }
    let open_end = trimmed
        .find('>')
        .ok_or_else(|| syntax(leading, "unterminated <style> tag"))?;
    let close = trimmed
        .find("</style>")
        .ok_or_else(|| syntax(leading, "<style> block is never closed"))?;
    if close < open_end {
        return Err(syntax(leading, "unterminated <style> tag"));
    }
    let css = trimmed[open_end + 1..close].trim().to_string();
    let body_start = leading + close + "</style>".len();
    let styles = Some(css).filter(|css| !css.is_empty());
    Ok((styles, &source[body_start..], body_start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn syntax_offset(source: &str) -> usize {
        match parse(source) {
            Err(CompileError::Syntax { offset, .. }) => offset,
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_values_and_text() {
        let template = parse("<p>{{name}} {{{html}}}</p>").unwrap();
        assert_eq!(template.styles, None);
        assert_eq!(
            template.body,
            vec![
                Node::Text("<p>".into()),
                Node::Value { path: "name".into(), escape: true },
                Node::Text(" ".into()),
                Node::Value { path: "html".into(), escape: false },
                Node::Text("</p>".into()),
            ]
        );
    }

    #[test]
    fn test_leading_style_block() {
        let template = parse("  <style>\n.tile { color: red }\n</style>\n<div></div>").unwrap();
        assert_eq!(template.styles.as_deref(), Some(".tile { color: red }"));
        assert_eq!(template.body, vec![Node::Text("\n<div></div>".into())]);
    }

    #[test]
    fn test_nested_blocks() {
        let template =
            parse("{{#each items}}{{#if active == true}}on{{else}}off{{/if}}{{else}}none{{/each}}")
                .unwrap();
        assert_eq!(
            template.body,
            vec![Node::Each {
                path: "items".into(),
                body: vec![Node::If {
                    condition: Condition::Equals("active".into(), json!(true)),
                    then: vec![Node::Text("on".into())],
                    otherwise: vec![Node::Text("off".into())],
                }],
                otherwise: vec![Node::Text("none".into())],
            }]
        );
    }

    #[test]
    fn test_partials_and_comments() {
        let template = parse("{{! header }}{{> productTile this}}{{> footer}}").unwrap();
        assert_eq!(
            template.body,
            vec![
                Node::Partial { relative: "productTile".into(), path: Some("this".into()) },
                Node::Partial { relative: "footer".into(), path: None },
            ]
        );
    }

    #[test]
    fn test_tag_errors_report_offsets() {
        assert_eq!(syntax_offset("abc{{name"), 3);
        assert_eq!(syntax_offset("{{#if a == nope}}{{/if}}"), 0);
        assert_eq!(syntax_offset("<style>.a{}"), 0);
        assert_eq!(syntax_offset("ab{{/unless}}"), 2);
    }

    #[test]
    fn test_stray_block_tags_are_rejected() {
        assert_eq!(syntax_offset("x{{/each}}"), 1);
        assert_eq!(syntax_offset("ab{{else}}"), 2);
        match parse("x{{/each}}") {
            Err(CompileError::Syntax { message, .. }) => assert!(message.contains("{{/each}}")),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_blocks_are_rejected() {
        for source in [
            "{{#if a}}x",
            "{{#if a}}{{/each}}",
            "{{#each a}}x{{else}}y{{else}}z{{/each}}",
            "{{#if a}}{{#each b}}{{/if}}{{/each}}",
        ] {
            assert!(
                matches!(parse(source), Err(CompileError::Syntax { .. })),
                "{} should not parse",
                source
            );
        }
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let deep = MAX_NESTING + 1;
        let source = format!("{}{}", "{{#if a}}".repeat(deep), "{{/if}}".repeat(deep));
        assert_eq!(syntax_offset(&source), MAX_NESTING * "{{#if a}}".len());

        let allowed = format!(
            "{}x{}",
            "{{#if a}}".repeat(MAX_NESTING),
            "{{/if}}".repeat(MAX_NESTING)
        );
        assert!(parse(&allowed).is_ok());
    }
}
