// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::dom::markup::{self, ParsedNode};
use crate::errors::DomError;

/// Stable handle to a node in a [`Document`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A child-list change on a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Added(NodeId),
    Removed {
        node: NodeId,
        parent: Option<NodeId>,
    },
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

const BOOLEAN_PROPERTIES: &[&str] = &["checked", "disabled", "selected", "hidden", "readonly"];

/// An arena-backed document tree.
///
/// Every child-list change under a live node (the document itself or a
/// free-standing root) is recorded as a [`Mutation`] until drained with
/// [`Document::take_mutations`]. Removed subtrees stay addressable until the
/// next [`Document::sweep`], so a node moved within one batch keeps its id.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
    html: NodeId,
    head: NodeId,
    body: NodeId,
    floating: BTreeSet<NodeId>,
    detached: BTreeSet<NodeId>,
    mutations: Vec<Mutation>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: HashMap::new(),
            next_id: 1,
            html: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            floating: BTreeSet::new(),
            detached: BTreeSet::new(),
            mutations: Vec::new(),
        };
        doc.html = doc.insert_node(element_kind("html", Vec::new()));
        doc.head = doc.insert_node(element_kind("head", Vec::new()));
        doc.body = doc.insert_node(element_kind("body", Vec::new()));
        doc.link(doc.html, doc.head);
        doc.link(doc.html, doc.body);
        doc
    }

    /// Parses a page. Content of `<head>`/`<body>` lands in the matching
    /// document node; anything else goes into the body. Parsing a page does
    /// not record mutations.
    pub fn parse(markup: &str) -> Result<Self, DomError> {
        let mut doc = Self::new();
        let mut stack = markup::parse_fragment(markup)?;
        stack.reverse();
        while let Some(node) = stack.pop() {
            match node {
                ParsedNode::Element {
                    tag,
                    attributes,
                    children,
                } if tag == "html" || tag == "head" || tag == "body" => {
                    let target = match tag.as_str() {
                        "head" => Some(doc.head),
                        "body" => Some(doc.body),
                        _ => None,
                    };
                    if let Some(target) = target {
                        if let Some(Node {
                            kind: NodeKind::Element { attributes: a, .. },
                            ..
                        }) = doc.nodes.get_mut(&target)
                        {
                            *a = attributes;
                        }
                        for child in children {
                            doc.build(target, child);
                        }
                    } else {
                        stack.extend(children.into_iter().rev());
                    }
                }
                other => {
                    let body = doc.body;
                    doc.build(body, other);
                }
            }
        }
        doc.mutations.clear();
        Ok(doc)
    }

    pub fn html(&self) -> NodeId {
        self.html
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn exists(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert_node(element_kind(&tag.to_ascii_lowercase(), Vec::new()))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.insert_node(NodeKind::Text(text.to_string()))
    }

    /// Creates an element that is live without being attached to the
    /// document: mutations inside it are recorded and it counts as connected.
    pub fn create_root_element(&mut self, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.floating.insert(id);
        id
    }

    /// Ends the life of a free-standing root. It is released on the next sweep.
    pub fn destroy_root(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node(id)?;
        if self.floating.remove(&id) {
            self.detached.insert(id);
            self.mutations.push(Mutation::Removed {
                node: id,
                parent: None,
            });
        }
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(&id),
            Some(Node {
                kind: NodeKind::Element { .. },
                ..
            })
        )
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(&id) {
            Some(Node {
                kind: NodeKind::Element { tag, .. },
                ..
            }) => Some(tag),
            _ => None,
        }
    }

    /// Moves `child` (with its subtree) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.detach(child);
        self.floating.remove(&child);
        self.detached.remove(&child);
        self.link(parent, child);
        if self.is_connected(parent) {
            self.mutations.push(Mutation::Added(child));
        }
        Ok(())
    }

    /// Detaches `id` from its parent. The subtree is released on the next sweep
    /// unless it is re-inserted first.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node(id)?;
        if self.parent(id).is_some() {
            self.detach(id);
            self.detached.insert(id);
        }
        Ok(())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.nodes.get(&id) {
            Some(Node {
                kind: NodeKind::Element { attributes, .. },
                ..
            }) => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let attributes = self.attributes_mut(id)?;
        let name = name.to_ascii_lowercase();
        match attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attributes.push((name, value.to_string())),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        self.attributes_mut(id)?.retain(|(k, _)| k != name);
        Ok(())
    }

    /// Reads an element property.
    ///
    /// `textContent` and `innerHTML` read the subtree; `value` follows the
    /// form control's kind; boolean properties read as `"true"`/`"false"`;
    /// anything else reflects the attribute of the same name.
    pub fn get_property(&self, id: NodeId, name: &str) -> Result<String, DomError> {
        let tag = self.element(id)?;
        Ok(match name {
            "textContent" => self.text_content(id),
            "innerHTML" => self.inner_html(id),
            "className" => self.get_attribute(id, "class").unwrap_or_default().to_string(),
            "value" => match tag {
                "textarea" => self.text_content(id),
                "select" => self.select_value(id),
                "option" => self.option_value(id),
                _ => self.get_attribute(id, "value").unwrap_or_default().to_string(),
            },
            _ if BOOLEAN_PROPERTIES.contains(&name) => self.has_attribute(id, name).to_string(),
            _ => self.get_attribute(id, name).unwrap_or_default().to_string(),
        })
    }

    pub fn set_property(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let tag = self.element(id)?.to_string();
        match name {
            "textContent" => self.set_text_content(id, value),
            "innerHTML" => self.set_inner_html(id, value),
            "className" => self.set_attribute(id, "class", value),
            "value" if tag == "textarea" => self.set_text_content(id, value),
            "value" if tag == "select" => {
                for option in self.elements_by_tag(id, "option") {
                    if self.option_value(option) == value {
                        self.set_attribute(option, "selected", "")?;
                    } else {
                        self.remove_attribute(option, "selected")?;
                    }
                }
                Ok(())
            }
            _ if BOOLEAN_PROPERTIES.contains(&name) => {
                if value.is_empty() || value == "false" {
                    self.remove_attribute(id, name)
                } else {
                    self.set_attribute(id, name, "")
                }
            }
            _ => self.set_attribute(id, name, value),
        }
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.element(id)?;
        self.clear_children(id);
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(())
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let raw = self.tag_name(id).is_some_and(markup::is_raw_text);
        for child in self.children(id) {
            self.serialize(*child, raw, &mut out);
        }
        out
    }

    /// Replaces the children of `id` with the parsed `markup`.
    pub fn set_inner_html(&mut self, id: NodeId, markup_text: &str) -> Result<(), DomError> {
        self.element(id)?;
        let parsed = markup::parse_fragment(markup_text)?;
        self.clear_children(id);
        for node in parsed {
            let child = self.build_detached(node);
            self.append_child(id, child)?;
        }
        Ok(())
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize(id, false, &mut out);
        out
    }

    /// The whole page.
    pub fn to_html(&self) -> String {
        format!("<!DOCTYPE html>{}", self.outer_html(self.html))
    }

    /// Descendants of `root` (excluding `root`) carrying attribute `name`,
    /// in document order.
    pub fn query_attribute(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.has_attribute(*id, name))
            .collect()
    }

    /// Descendant elements of `root` with the given tag, in document order.
    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.tag_name(*id) == Some(tag))
            .collect()
    }

    /// Descendants of `root` in document order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Whether `node` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Connected to the document or to a live free-standing root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.html || self.floating.contains(&node) {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    pub fn has_pending_mutations(&self) -> bool {
        !self.mutations.is_empty()
    }

    /// Releases removed subtrees that were not re-inserted and returns every
    /// node id that ceased to exist.
    pub fn sweep(&mut self) -> Vec<NodeId> {
        let candidates = std::mem::take(&mut self.detached);
        let mut released = Vec::new();
        for id in candidates {
            let orphan = self
                .nodes
                .get(&id)
                .is_some_and(|n| n.parent.is_none() && !self.floating.contains(&id));
            if !orphan {
                continue;
            }
            let mut subtree = self.descendants(id);
            subtree.push(id);
            for node in &subtree {
                self.nodes.remove(node);
            }
            released.extend(subtree);
        }
        released
    }

    fn insert_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let was_connected = self.is_connected(parent);
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|c| *c != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
        if was_connected {
            self.mutations.push(Mutation::Removed {
                node: id,
                parent: Some(parent),
            });
        }
    }

    fn clear_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.children(id).to_vec();
        for child in children {
            self.detach(child);
            self.detached.insert(child);
        }
    }

    fn build(&mut self, parent: NodeId, parsed: ParsedNode) {
        let id = self.build_detached(parsed);
        self.link(parent, id);
    }

    fn build_detached(&mut self, parsed: ParsedNode) -> NodeId {
        match parsed {
            ParsedNode::Text(text) => self.insert_node(NodeKind::Text(text)),
            ParsedNode::Element {
                tag,
                attributes,
                children,
            } => {
                let id = self.insert_node(NodeKind::Element { tag, attributes });
                for child in children {
                    self.build(id, child);
                }
                id
            }
        }
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(&id).ok_or(DomError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&str, DomError> {
        match &self.node(id)?.kind {
            NodeKind::Element { tag, .. } => Ok(tag),
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    fn attributes_mut(&mut self, id: NodeId) -> Result<&mut Vec<(String, String)>, DomError> {
        match self.nodes.get_mut(&id) {
            Some(Node {
                kind: NodeKind::Element { attributes, .. },
                ..
            }) => Ok(attributes),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    fn option_value(&self, option: NodeId) -> String {
        match self.get_attribute(option, "value") {
            Some(value) => value.to_string(),
            None => self.text_content(option).trim().to_string(),
        }
    }

    fn select_value(&self, select: NodeId) -> String {
        let options = self.elements_by_tag(select, "option");
        options
            .iter()
            .find(|o| self.has_attribute(**o, "selected"))
            .or_else(|| options.first())
            .map(|o| self.option_value(*o))
            .unwrap_or_default()
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.nodes.get(&id) {
            Some(Node {
                kind: NodeKind::Text(text),
                ..
            }) => out.push_str(text),
            Some(node) => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    fn serialize(&self, id: NodeId, raw: bool, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) if raw => out.push_str(text),
            NodeKind::Text(text) => out.push_str(&markup::escape_text(text)),
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&markup::escape_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if markup::is_void(tag) {
                    return;
                }
                let raw = markup::is_raw_text(tag);
                for child in &node.children {
                    self.serialize(*child, raw, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn element_kind(tag: &str, attributes: Vec<(String, String)>) -> NodeKind {
    NodeKind::Element {
        tag: tag.to_string(),
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_by_tag(doc: &Document, tag: &str) -> NodeId {
        doc.elements_by_tag(doc.html(), tag)[0]
    }

    #[test]
    fn test_parse_page_routes_head_and_body() {
        let doc = Document::parse(
            "<!DOCTYPE html><html><head><title>t</title></head><body><p>x</p></body></html>",
        )
        .unwrap();
        assert_eq!(doc.tag_name(doc.children(doc.head())[0]), Some("title"));
        assert_eq!(doc.inner_html(doc.body()), "<p>x</p>");
        assert!(!doc.has_pending_mutations());
    }

    #[test]
    fn test_bare_markup_lands_in_body() {
        let doc = Document::parse("<span>a</span>b").unwrap();
        assert_eq!(doc.inner_html(doc.body()), "<span>a</span>b");
    }

    #[test]
    fn test_append_records_added_only_when_connected() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(outer, inner).unwrap();
        assert!(doc.take_mutations().is_empty());

        doc.append_child(doc.body(), outer).unwrap();
        assert_eq!(doc.take_mutations(), vec![Mutation::Added(outer)]);
        assert!(doc.is_connected(inner));
    }

    #[test]
    fn test_move_keeps_node_alive_across_sweep() {
        let mut doc = Document::parse("<div id=a><span>x</span></div><div id=b></div>").unwrap();
        let divs = doc.elements_by_tag(doc.body(), "div");
        let span = doc.elements_by_tag(divs[0], "span")[0];

        doc.remove(span).unwrap();
        doc.append_child(divs[1], span).unwrap();
        assert!(doc.sweep().is_empty());
        assert_eq!(
            doc.take_mutations(),
            vec![
                Mutation::Removed {
                    node: span,
                    parent: Some(divs[0])
                },
                Mutation::Added(span)
            ]
        );
    }

    #[test]
    fn test_sweep_releases_removed_subtrees() {
        let mut doc = Document::parse("<div><span>x</span></div>").unwrap();
        let div = first_by_tag(&doc, "div");
        let span = first_by_tag(&doc, "span");
        doc.remove(div).unwrap();

        let released = doc.sweep();
        assert!(released.contains(&div));
        assert!(released.contains(&span));
        assert!(!doc.exists(span));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut doc = Document::parse("<div><span></span></div>").unwrap();
        let div = first_by_tag(&doc, "div");
        let span = first_by_tag(&doc, "span");
        assert_eq!(
            doc.append_child(span, div),
            Err(DomError::HierarchyRequest {
                parent: span,
                child: div
            })
        );
    }

    #[test]
    fn test_form_control_values() {
        let mut doc = Document::parse(
            r#"<input value="3"><textarea>note</textarea><select><option>a</option><option value="bee">b</option></select>"#,
        )
        .unwrap();
        let input = first_by_tag(&doc, "input");
        let textarea = first_by_tag(&doc, "textarea");
        let select = first_by_tag(&doc, "select");

        assert_eq!(doc.get_property(input, "value").unwrap(), "3");
        assert_eq!(doc.get_property(textarea, "value").unwrap(), "note");
        assert_eq!(doc.get_property(select, "value").unwrap(), "a");

        doc.set_property(select, "value", "bee").unwrap();
        assert_eq!(doc.get_property(select, "value").unwrap(), "bee");
        doc.set_property(input, "value", "4").unwrap();
        assert_eq!(doc.outer_html(input), r#"<input value="4">"#);
    }

    #[test]
    fn test_boolean_and_reflected_properties() {
        let mut doc = Document::parse("<input type=checkbox>").unwrap();
        let input = first_by_tag(&doc, "input");
        doc.set_property(input, "checked", "true").unwrap();
        assert_eq!(doc.get_property(input, "checked").unwrap(), "true");
        doc.set_property(input, "checked", "false").unwrap();
        assert_eq!(doc.get_property(input, "checked").unwrap(), "false");

        doc.set_property(input, "className", "on").unwrap();
        assert_eq!(doc.get_attribute(input, "class"), Some("on"));
    }

    #[test]
    fn test_inner_html_replaces_children_and_records() {
        let mut doc = Document::parse("<div><b>old</b></div>").unwrap();
        let div = first_by_tag(&doc, "div");
        let old = first_by_tag(&doc, "b");
        doc.set_inner_html(div, "<i>new</i>").unwrap();

        let mutations = doc.take_mutations();
        assert_eq!(mutations.len(), 2);
        assert_eq!(
            mutations[0],
            Mutation::Removed {
                node: old,
                parent: Some(div)
            }
        );
        assert_eq!(doc.inner_html(div), "<i>new</i>");
    }

    #[test]
    fn test_floating_roots_are_live() {
        let mut doc = Document::new();
        let root = doc.create_root_element("div");
        let child = doc.create_element("p");
        doc.append_child(root, child).unwrap();
        assert!(doc.is_connected(child));
        assert_eq!(doc.take_mutations(), vec![Mutation::Added(child)]);

        doc.destroy_root(root).unwrap();
        assert!(!doc.is_connected(child));
        assert_eq!(doc.sweep().len(), 2);
    }

    #[test]
    fn test_serialization_escapes() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attribute(div, "data-context", r#"{"a":"<b>"}"#).unwrap();
        doc.set_text_content(div, "1 < 2").unwrap();
        assert_eq!(
            doc.outer_html(div),
            r#"<div data-context="{&quot;a&quot;:&quot;<b>&quot;}">1 &lt; 2</div>"#
        );
    }
}
