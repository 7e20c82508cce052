// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Node storage for the reference host
//!
//! An index-based arena. Nodes are never freed: a removed node stays in the
//! arena, detached, so handles to it remain valid.

use crate::error::{Error, Result};

/// Index of a node in the arena
pub type NodeId = usize;

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// `<!DOCTYPE name>`
    Doctype(String),
    /// Element with attributes in source order
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    /// Text node
    Text(String),
    /// Comment node
    Comment(String),
}

/// Internal node data
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena-backed node tree
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node
    pub fn document(&self) -> NodeId {
        0
    }

    /// Number of nodes ever created
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached node
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes
            .get(id)
            .ok_or_else(|| Error::other(format!("no node with id {}", id)))
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id).map(|n| &n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// All child nodes, text included
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children only
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element { .. }))
    }

    /// Lowercase tag name for elements
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Element { tag, .. }) => Some(tag),
            _ => None,
        }
    }

    /// The root element (`<html>` for parsed documents)
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.document())
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    /// First `<body>` element in document order
    pub fn body(&self) -> Option<NodeId> {
        self.descendants(self.document())
            .into_iter()
            .find(|&id| self.tag(id) == Some("body"))
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Element { attributes, .. }) => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Element { attributes, .. }) => {
                let name = name.to_ascii_lowercase();
                match attributes.iter_mut().find(|(k, _)| *k == name) {
                    Some((_, v)) => *v = value.to_string(),
                    None => attributes.push((name, value.to_string())),
                }
                Ok(())
            }
            _ => Err(Error::other(format!("node {} is not an element", id))),
        }
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Remove `id` from its parent, if any
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        }
        if let Some(n) = self.nodes.get_mut(id) {
            n.parent = None;
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.document() {
            return Err(Error::other("the document node cannot be inserted"));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(Error::other("cannot insert a node into its own subtree"));
        }
        Ok(())
    }

    /// Move `child` to the end of `parent`'s children
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Move `new` right before `reference` in `reference`'s parent
    ///
    /// Returns `false` without changing anything if `reference` is detached.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) -> Result<bool> {
        let Some(parent) = self.parent(reference) else {
            return Ok(false);
        };
        if new == reference {
            return Ok(true);
        }
        self.check_insert(parent, new)?;
        self.detach(new);
        let position = self.nodes[parent]
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(self.nodes[parent].children.len());
        self.nodes[parent].children.insert(position, new);
        self.nodes[new].parent = Some(parent);
        Ok(true)
    }

    /// Detach `child` if it is a child of `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    /// Replace all children of `id`
    pub fn replace_children(&mut self, id: NodeId, children: &[NodeId]) -> Result<()> {
        self.node(id)?;
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        for &child in children {
            self.append(id, child)?;
        }
        Ok(())
    }

    /// Put `replacements` where `id` is and detach `id`
    pub fn replace_with(&mut self, id: NodeId, replacements: &[NodeId]) -> Result<()> {
        let parent = self
            .parent(id)
            .ok_or_else(|| Error::other("node has no parent"))?;
        for &new in replacements {
            self.insert_before(id, new)?;
        }
        self.remove_child(parent, id);
        Ok(())
    }

    /// `id` and everything below it, in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match self.kind(n) {
                Some(NodeKind::Text(t)) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Open tag for elements, text for text nodes
    pub fn describe(&self, id: NodeId) -> String {
        match self.kind(id) {
            Some(NodeKind::Element { tag, attributes }) => open_tag(tag, attributes),
            Some(NodeKind::Text(text)) => text.clone(),
            Some(NodeKind::Comment(text)) => format!("<!--{}-->", text),
            Some(NodeKind::Doctype(name)) => format!("<!DOCTYPE {}>", name),
            Some(NodeKind::Document) => "#document".to_string(),
            None => String::new(),
        }
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.serialize_into(child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_into(id, &mut out);
        out
    }

    fn serialize_into(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => out.push_str(&escape_text(text)),
            Some(NodeKind::Comment(text)) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Some(NodeKind::Doctype(name)) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            Some(NodeKind::Element { tag, attributes }) => {
                out.push_str(&open_tag(tag, attributes));
                if !VOID_ELEMENTS.contains(&tag.as_str()) {
                    for &child in self.children(id) {
                        self.serialize_into(child, out);
                    }
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
            }
            Some(NodeKind::Document) => {
                for &child in self.children(id) {
                    self.serialize_into(child, out);
                }
            }
            None => {}
        }
    }
}

fn open_tag(tag: &str, attributes: &[(String, String)]) -> String {
    let mut out = format!("<{}", tag);
    for (name, value) in attributes {
        if value.is_empty() {
            out.push_str(&format!(" {}", name));
        } else {
            out.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
        }
    }
    out.push('>');
    out
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// <div id="a"><p>one</p><p>two</p></div>
    fn sample() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let div = tree.create_element("DIV");
        tree.set_attribute(div, "id", "a").unwrap();
        let p1 = tree.create_element("p");
        let t1 = tree.create(NodeKind::Text("one".into()));
        let p2 = tree.create_element("p");
        let t2 = tree.create(NodeKind::Text("two".into()));
        tree.append(tree.document(), div).unwrap();
        tree.append(div, p1).unwrap();
        tree.append(p1, t1).unwrap();
        tree.append(div, p2).unwrap();
        tree.append(p2, t2).unwrap();
        (tree, div, p1, p2)
    }

    #[test]
    fn test_serialization() {
        let (tree, div, p1, _) = sample();
        assert_eq!(tree.outer_html(div), r#"<div id="a"><p>one</p><p>two</p></div>"#);
        assert_eq!(tree.inner_html(p1), "one");
        assert_eq!(tree.describe(div), r#"<div id="a">"#);
        assert_eq!(tree.text_content(div), "onetwo");
        assert_eq!(tree.document_element(), Some(div));
    }

    #[test]
    fn test_append_moves_node() {
        let (mut tree, div, p1, p2) = sample();
        tree.append(p2, p1).unwrap();
        assert_eq!(tree.parent(p1), Some(p2));
        assert_eq!(tree.element_children(div), vec![p2]);
        assert_eq!(tree.outer_html(div), r#"<div id="a"><p>two<p>one</p></p></div>"#);
    }

    #[test]
    fn test_append_rejects_cycles() {
        let (mut tree, div, p1, _) = sample();
        assert!(tree.append(p1, div).is_err());
        assert!(tree.append(div, div).is_err());
        assert_eq!(tree.parent(p1), Some(div));
    }

    #[test]
    fn test_insert_before() {
        let (mut tree, div, p1, p2) = sample();
        let hr = tree.create_element("hr");
        assert!(tree.insert_before(p2, hr).unwrap());
        assert_eq!(tree.element_children(div), vec![p1, hr, p2]);

        let detached = tree.create_element("span");
        let other = tree.create_element("b");
        assert!(!tree.insert_before(detached, other).unwrap());
        assert_eq!(tree.parent(other), None);
    }

    #[test]
    fn test_remove_child() {
        let (mut tree, div, p1, p2) = sample();
        assert!(!tree.remove_child(p2, p1));
        assert!(tree.remove_child(div, p1));
        assert_eq!(tree.parent(p1), None);
        assert_eq!(tree.element_children(div), vec![p2]);
        // Still addressable after removal
        assert_eq!(tree.inner_html(p1), "one");
    }

    #[test]
    fn test_replace_with() {
        let (mut tree, div, p1, p2) = sample();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        tree.replace_with(p1, &[a, b]).unwrap();
        assert_eq!(tree.element_children(div), vec![a, b, p2]);
        assert_eq!(tree.parent(p1), None);
        assert!(tree.replace_with(p1, &[]).is_err());
    }

    #[test]
    fn test_escaping() {
        let mut tree = Tree::new();
        let a = tree.create_element("a");
        tree.set_attribute(a, "title", "say \"hi\" & go").unwrap();
        tree.set_attribute(a, "hidden", "").unwrap();
        let text = tree.create(NodeKind::Text("1 < 2".into()));
        tree.append(a, text).unwrap();
        assert_eq!(
            tree.outer_html(a),
            r#"<a title="say &quot;hi&quot; &amp; go" hidden>1 &lt; 2</a>"#
        );
    }
}
