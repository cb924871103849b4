// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value as Json;

use crate::backends::template::parser::{Condition, Node, Template};
use crate::errors::RenderError;
use crate::traits::{FragmentModule, Require};

/// A compiled template fragment.
///
/// Rendering only reads the JSON handed to `render`; the one way out of the
/// template is `{{> relative}}`, which goes through [`Require`].
pub struct TemplateFragment {
    template: Template,
    require: Require,
}

/// One level of the lookup stack: the current value and, inside `#each`,
/// the item's position.
struct Frame<'a> {
    value: &'a Json,
    index: Option<usize>,
    key: Option<&'a str>,
}

impl TemplateFragment {
    pub fn new(template: Template, require: Require) -> Self {
        Self { template, require }
    }

    fn render_nodes(&self, nodes: &[Node], stack: &[Frame<'_>], out: &mut String) {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Value { path, escape } => {
                    let text = display(lookup(stack, path).as_ref());
                    if *escape {
                        out.push_str(&escape_html(&text));
                    } else {
                        out.push_str(&text);
                    }
                }
                Node::If {
                    condition,
                    then,
                    otherwise,
                } => {
                    let holds = match condition {
                        Condition::Truthy(path) => is_truthy(lookup(stack, path).as_ref()),
                        Condition::Equals(path, literal) => {
                            lookup(stack, path).as_ref().unwrap_or(&Json::Null) == literal
                        }
                    };
                    let branch = if holds { then } else { otherwise };
                    self.render_nodes(branch, stack, out);
                }
                Node::Each {
                    path,
                    body,
                    otherwise,
                } => {
                    let Some(items) = lookup(stack, path) else {
                        self.render_nodes(otherwise, stack, out);
                        continue;
                    };
                    self.render_each(&items, body, otherwise, stack, out);
                }
                Node::Partial { relative, path } => {
                    let data = match path {
                        Some(path) => lookup(stack, path).unwrap_or(Json::Null),
                        None => stack.last().map_or(Json::Null, |frame| frame.value.clone()),
                    };
                    out.push_str(&self.require.placeholder(relative, &data));
                }
            }
        }
    }

    fn render_each(
        &self,
        items: &Json,
        body: &[Node],
        otherwise: &[Node],
        stack: &[Frame<'_>],
        out: &mut String,
    ) {
        match items {
            Json::Array(list) if !list.is_empty() => {
                for (index, item) in list.iter().enumerate() {
                    let mut inner = frames_over(stack);
                    inner.push(Frame {
                        value: item,
                        index: Some(index),
                        key: None,
                    });
                    self.render_nodes(body, &inner, out);
                }
            }
            Json::Object(map) if !map.is_empty() => {
                for (index, (key, item)) in map.iter().enumerate() {
                    let mut inner = frames_over(stack);
                    inner.push(Frame {
                        value: item,
                        index: Some(index),
                        key: Some(key.as_str()),
                    });
                    self.render_nodes(body, &inner, out);
                }
            }
            _ => self.render_nodes(otherwise, stack, out),
        }
    }
}

/// Re-borrows the outer frames so an `#each` body can push frames that
/// borrow from a value owned by the caller.
fn frames_over<'a>(stack: &'a [Frame<'_>]) -> Vec<Frame<'a>> {
    stack
        .iter()
        .map(|frame| Frame {
            value: frame.value,
            index: frame.index,
            key: frame.key,
        })
        .collect()
}

impl FragmentModule for TemplateFragment {
    fn render(&self, data: &Json) -> Result<String, RenderError> {
        let stack = [Frame {
            value: data,
            index: None,
            key: None,
        }];
        let mut out = String::new();
        self.render_nodes(&self.template.body, &stack, &mut out);
        Ok(out)
    }

    fn styles(&self) -> Result<Option<String>, RenderError> {
        Ok(self.template.styles.clone())
    }

    fn kind(&self) -> &'static str {
        "template"
    }
}

/// Resolves a template path against the frame stack.
///
/// `this` and `.` name the innermost value, `@index` / `@key` the current
/// `#each` position and `../` steps out one frame. A bare path is looked up
/// from the innermost frame outwards; the first frame whose value has the
/// leading key wins.
fn lookup(stack: &[Frame<'_>], path: &str) -> Option<Json> {
    let mut depth = stack.len();
    let mut path = path;
    while let Some(rest) = path.strip_prefix("../") {
        depth = depth.saturating_sub(1);
        path = rest;
    }
    let frames = &stack[..depth.max(1).min(stack.len())];
    let current = frames.last()?;

    match path {
        "this" | "." => return Some(current.value.clone()),
        "@index" => return current.index.map(Json::from),
        "@key" => return current.key.map(Json::from),
        _ => {}
    }

    if let Some(rest) = path.strip_prefix("this.") {
        return walk(current.value, rest).cloned();
    }

    let head = path.split('.').next().unwrap_or(path);
    frames
        .iter()
        .rev()
        .find(|frame| child(frame.value, head).is_some())
        .and_then(|frame| walk(frame.value, path))
        .cloned()
}

fn walk<'a>(value: &'a Json, path: &str) -> Option<&'a Json> {
    path.split('.')
        .try_fold(value, |current, segment| child(current, segment))
}

fn child<'a>(value: &'a Json, segment: &str) -> Option<&'a Json> {
    match value {
        Json::Object(map) => map.get(segment),
        Json::Array(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
        _ => None,
    }
}

fn display(value: Option<&Json>) -> String {
    match value {
        None | Some(Json::Null) => String::new(),
        Some(Json::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn is_truthy(value: Option<&Json>) -> bool {
    match value {
        None | Some(Json::Null) => false,
        Some(Json::Bool(b)) => *b,
        Some(Json::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Json::String(s)) => !s.is_empty(),
        Some(Json::Array(list)) => !list.is_empty(),
        Some(Json::Object(_)) => true,
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
