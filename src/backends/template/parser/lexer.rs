// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Splits a template body into text runs and classified tags.

use std::fmt;

use chumsky::prelude::*;

use super::{syntax, Condition};
use crate::errors::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    If,
    Each,
}

impl Block {
    fn name(self) -> &'static str {
        match self {
            Block::If => "if",
            Block::Each => "each",
        }
    }
}

/// One classified piece of template source.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Text(String),
    Value { path: String, escape: bool },
    OpenIf(Condition),
    OpenEach(String),
    Else,
    Close(Block),
    Partial { relative: String, path: Option<String> },
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Text(_) => f.write_str("text"),
            Tag::Value { path, escape: true } => write!(f, "{{{{{}}}}}", path),
            Tag::Value { path, escape: false } => write!(f, "{{{{{{{}}}}}}}", path),
            Tag::OpenIf(_) => f.write_str("{{#if}}"),
            Tag::OpenEach(path) => write!(f, "{{{{#each {}}}}}", path),
            Tag::Else => f.write_str("{{else}}"),
            Tag::Close(block) => write!(f, "{{{{/{}}}}}", block.name()),
            Tag::Partial { relative, .. } => write!(f, "{{{{> {}}}}}", relative),
        }
    }
}

/// Raw pieces before classification.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Lexeme<'src> {
    Text(&'src str),
    Tag(&'src str),
    Raw(&'src str),
    Unclosed(&'static str),
}

fn lexer<'src>(
) -> impl Parser<'src, &'src str, Vec<(Lexeme<'src>, SimpleSpan)>, extra::Err<Rich<'src, char>>> {
    let text = any()
        .and_is(just("{{").not())
        .repeated()
        .at_least(1)
        .to_slice()
        .map(Lexeme::Text);

    // an unterminated tag runs to the end of input
    let raw = just("{{{")
        .ignore_then(any().and_is(just("}}}").not()).repeated().to_slice())
        .then(just("}}}").or_not())
        .map(|(inner, close): (&'src str, Option<&str>)| match close {
            Some(_) => Lexeme::Raw(inner.trim()),
            None => Lexeme::Unclosed("{{{"),
        });

    let tag = just("{{")
        .ignore_then(any().and_is(just("}}").not()).repeated().to_slice())
        .then(just("}}").or_not())
        .map(|(inner, close): (&'src str, Option<&str>)| match close {
            Some(_) => Lexeme::Tag(inner.trim()),
            None => Lexeme::Unclosed("{{"),
        });

    choice((raw, tag, text))
        .map_with(|lexeme, extra| (lexeme, extra.span()))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

/// Lexes `body`, whose first byte sits at `base` in the template source.
/// Spans in the result are relative to the whole source. Comments are
/// dropped.
pub fn tokenize(body: &str, base: usize) -> Result<Vec<(Tag, SimpleSpan)>, CompileError> {
    let lexemes = lexer().parse(body).into_result().map_err(|errors| {
        let offset = errors.first().map_or(0, |error| error.span().start);
        syntax(base + offset, "unreadable template text")
    })?;

    let mut tokens = Vec::with_capacity(lexemes.len());
    for (lexeme, span) in lexemes {
        let offset = base + span.start;
        let tag = match lexeme {
            Lexeme::Text(text) => Some(Tag::Text(text.to_string())),
            Lexeme::Raw("") => return Err(syntax(offset, "empty raw value tag")),
            Lexeme::Raw(path) => Some(Tag::Value {
                path: path.to_string(),
                escape: false,
            }),
            Lexeme::Tag(content) => classify(content, offset)?,
            Lexeme::Unclosed(open) => {
                return Err(syntax(offset, &format!("unclosed '{}'", open)))
            }
        };
        if let Some(tag) = tag {
            tokens.push((tag, SimpleSpan::from(offset..base + span.end)));
        }
    }
    Ok(tokens)
}

/// Classifies the trimmed contents of a `{{ … }}` tag. Comments yield `None`.
fn classify(content: &str, offset: usize) -> Result<Option<Tag>, CompileError> {
    if content.starts_with('!') {
        return Ok(None);
    }
    if content == "else" {
        return Ok(Some(Tag::Else));
    }
    if let Some(name) = content.strip_prefix('/') {
        return match name.trim() {
            "if" => Ok(Some(Tag::Close(Block::If))),
            "each" => Ok(Some(Tag::Close(Block::Each))),
            other => Err(syntax(offset, &format!("unknown block '{}'", other))),
        };
    }
    if let Some(expression) = content.strip_prefix("#if") {
        return Ok(Some(Tag::OpenIf(parse_condition(expression.trim(), offset)?)));
    }
    if let Some(path) = content.strip_prefix("#each") {
        let path = path.trim();
        if path.is_empty() {
            return Err(syntax(offset, "'#each' needs a path"));
        }
        return Ok(Some(Tag::OpenEach(path.to_string())));
    }
    if content.starts_with('#') {
        return Err(syntax(offset, &format!("unknown block '{}'", content)));
    }
    if let Some(arguments) = content.strip_prefix('>') {
        let mut parts = arguments.split_whitespace();
        let relative = parts
            .next()
            .ok_or_else(|| syntax(offset, "'>' needs a fragment path"))?;
        let path = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Err(syntax(offset, "'>' takes at most a fragment path and a data path"));
        }
        return Ok(Some(Tag::Partial {
            relative: relative.to_string(),
            path,
        }));
    }
    if content.is_empty() {
        return Err(syntax(offset, "empty value tag"));
    }
    Ok(Some(Tag::Value {
        path: content.to_string(),
        escape: true,
    }))
}

fn parse_condition(expression: &str, offset: usize) -> Result<Condition, CompileError> {
    match expression.split_once("==") {
        Some((path, literal)) => {
            let path = path.trim();
            if path.is_empty() {
                return Err(syntax(offset, "'#if' comparison needs a path"));
            }
            let literal = serde_json::from_str(literal.trim()).map_err(|e| {
                syntax(offset, &format!("'#if' comparison literal is not JSON: {}", e))
            })?;
            Ok(Condition::Equals(path.to_string(), literal))
        }
        None if expression.is_empty() => Err(syntax(offset, "'#if' needs a path")),
        None => Ok(Condition::Truthy(expression.to_string())),
    }
}
