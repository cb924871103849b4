// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A small, lenient markup parser and the matching serializer helpers.
//!
//! Covers what fragments and pages actually contain: elements with quoted or
//! bare attributes, void elements, raw-text elements (`style`, `script`,
//! `textarea`), character references, comments and doctypes. Unclosed
//! elements are closed at end of input and stray end tags are ignored.

use crate::errors::DomError;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Elements whose text is serialized verbatim.
pub fn is_raw_text(tag: &str) -> bool {
    tag == "script" || tag == "style"
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<ParsedNode>,
    },
    Text(String),
}

/// Parses a markup fragment into a forest of nodes.
pub fn parse_fragment(input: &str) -> Result<Vec<ParsedNode>, DomError> {
    Parser::new(input).run()
}

struct OpenElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<ParsedNode>,
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    stack: Vec<OpenElement>,
    top: Vec<ParsedNode>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            stack: Vec::new(),
            top: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<ParsedNode>, DomError> {
        while self.pos < self.input.len() {
            let rest = &self.input[self.pos..];
            if rest.starts_with("<!--") {
                let end = self.find_from(self.pos + 4, "-->", "unterminated comment")?;
                self.pos = end + 3;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                let end = self.find_from(self.pos, ">", "unterminated declaration")?;
                self.pos = end + 1;
            } else if rest.starts_with("</") {
                self.end_tag()?;
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                self.start_tag()?;
            } else {
                let first = rest.chars().next().map_or(1, char::len_utf8);
                let next = rest[first..]
                    .find('<')
                    .map_or(self.input.len(), |i| self.pos + first + i);
                let text = decode_entities(&self.input[self.pos..next]);
                self.push(ParsedNode::Text(text));
                self.pos = next;
            }
        }
        while let Some(open) = self.stack.pop() {
            self.close(open);
        }
        Ok(self.top)
    }

    fn find_from(&self, from: usize, needle: &str, message: &str) -> Result<usize, DomError> {
        self.input[from..]
            .find(needle)
            .map(|i| from + i)
            .ok_or_else(|| DomError::Markup {
                offset: self.pos,
                message: message.to_string(),
            })
    }

    fn push(&mut self, node: ParsedNode) {
        match self.stack.last_mut() {
            Some(open) => open.children.push(node),
            None => self.top.push(node),
        }
    }

    fn close(&mut self, open: OpenElement) {
        self.push(ParsedNode::Element {
            tag: open.tag,
            attributes: open.attributes,
            children: open.children,
        });
    }

    fn end_tag(&mut self) -> Result<(), DomError> {
        let end = self.find_from(self.pos, ">", "unterminated end tag")?;
        let tag = self.input[self.pos + 2..end].trim().to_ascii_lowercase();
        self.pos = end + 1;
        if let Some(depth) = self.stack.iter().rposition(|open| open.tag == tag) {
            while self.stack.len() > depth {
                if let Some(open) = self.stack.pop() {
                    self.close(open);
                }
            }
        }
        Ok(())
    }

    fn start_tag(&mut self) -> Result<(), DomError> {
        let start = self.pos;
        self.pos += 1;
        let tag = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':');
        let tag = tag.to_ascii_lowercase();
        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                return Err(DomError::Markup {
                    offset: start,
                    message: format!("unterminated <{}> tag", tag),
                });
            };
            match c {
                '>' => {
                    self.pos += 1;
                    break;
                }
                '/' => {
                    self.pos += 1;
                    self_closing = true;
                }
                _ => {
                    let name = self
                        .take_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/')
                        .to_ascii_lowercase();
                    if name.is_empty() {
                        self.pos += c.len_utf8();
                        continue;
                    }
                    self.skip_whitespace();
                    let value = if self.peek() == Some('=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        self.attribute_value(start)?
                    } else {
                        String::new()
                    };
                    if !attributes.iter().any(|(existing, _)| *existing == name) {
                        attributes.push((name, value));
                    }
                }
            }
        }

        if is_void(&tag) || self_closing {
            self.push(ParsedNode::Element {
                tag,
                attributes,
                children: Vec::new(),
            });
            return Ok(());
        }

        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let close = format!("</{}", tag);
            let end = self.input[self.pos..]
                .to_ascii_lowercase()
                .find(&close)
                .map_or(self.input.len(), |i| self.pos + i);
            let raw = &self.input[self.pos..end];
            let text = if tag == "textarea" {
                decode_entities(raw)
            } else {
                raw.to_string()
            };
            let children = if text.is_empty() {
                Vec::new()
            } else {
                vec![ParsedNode::Text(text)]
            };
            self.pos = match self.input[end..].find('>') {
                Some(i) => end + i + 1,
                None => self.input.len(),
            };
            self.push(ParsedNode::Element {
                tag,
                attributes,
                children,
            });
            return Ok(());
        }

        self.stack.push(OpenElement {
            tag,
            attributes,
            children: Vec::new(),
        });
        Ok(())
    }

    fn attribute_value(&mut self, tag_start: usize) -> Result<String, DomError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let from = self.pos + 1;
                let end = self.input[from..]
                    .find(quote)
                    .map(|i| from + i)
                    .ok_or_else(|| DomError::Markup {
                        offset: tag_start,
                        message: "unterminated attribute value".to_string(),
                    })?;
                self.pos = end + 1;
                Ok(decode_entities(&self.input[from..end]))
            }
            _ => {
                let raw = self.take_while(|c| !c.is_whitespace() && c != '>');
                Ok(decode_entities(raw))
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn take_while<F: Fn(char) -> bool>(&mut self, f: F) -> &'a str {
        let input = self.input;
        let rest = &input[self.pos..];
        let len = rest.find(|c: char| !f(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }
}

/// Decodes character references. Unknown references are kept as written.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let name = &rest[1..semi];
            let c = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            c.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
