// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTML parsing into the host tree using html5ever

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle as RcHandle, NodeData as RcNodeData, RcDom};

use super::tree::{NodeId, NodeKind, Tree};
use crate::error::{Error, Result};

fn parse_rcdom(html: &str) -> Result<RcDom> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| Error::HtmlParse(e.to_string()))
}

/// Parse a full document into a fresh tree
pub fn parse_html(html: &str) -> Result<Tree> {
    let dom = parse_rcdom(html)?;
    let mut tree = Tree::new();
    let root = tree.document();

    let mut converter = TreeConverter { tree: &mut tree };
    for child in dom.document.children.borrow().iter() {
        if let Some(id) = converter.convert(child)? {
            converter.tree.append(root, id)?;
        }
    }

    Ok(tree)
}

/// Parse markup as `<body>` content; the returned nodes are detached
pub fn parse_fragment(tree: &mut Tree, html: &str) -> Result<Vec<NodeId>> {
    let dom = parse_rcdom(&format!("<html><body>{}</body></html>", html))?;
    let Some(body) = find_body(&dom.document) else {
        return Ok(Vec::new());
    };

    let mut converter = TreeConverter { tree };
    let mut nodes = Vec::new();
    for child in body.children.borrow().iter() {
        if let Some(id) = converter.convert(child)? {
            nodes.push(id);
        }
    }
    Ok(nodes)
}

fn find_body(handle: &RcHandle) -> Option<RcHandle> {
    if let RcNodeData::Element { ref name, .. } = handle.data {
        if &*name.local == "body" {
            return Some(handle.clone());
        }
    }
    handle.children.borrow().iter().find_map(find_body)
}

/// Copies an html5ever DOM into the arena
struct TreeConverter<'a> {
    tree: &'a mut Tree,
}

impl TreeConverter<'_> {
    fn convert(&mut self, handle: &RcHandle) -> Result<Option<NodeId>> {
        let kind = match handle.data {
            RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => return Ok(None),
            RcNodeData::Doctype { ref name, .. } => NodeKind::Doctype(name.to_string()),
            RcNodeData::Text { ref contents } => {
                let text = contents.borrow().to_string();
                if text.trim().is_empty() && text.len() > 1 {
                    // Formatting whitespace between tags
                    return Ok(None);
                }
                NodeKind::Text(text)
            }
            RcNodeData::Comment { ref contents } => NodeKind::Comment(contents.to_string()),
            RcNodeData::Element {
                ref name,
                ref attrs,
                ..
            } => NodeKind::Element {
                tag: name.local.to_string(),
                attributes: attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect(),
            },
        };

        let id = self.tree.create(kind);
        for child in handle.children.borrow().iter() {
            if let Some(child_id) = self.convert(child)? {
                self.tree.append(id, child_id)?;
            }
        }
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let tree = parse_html("<!DOCTYPE html><html><head><title>Guests</title></head><body><p>Hello</p></body></html>").unwrap();

        let children = tree.children(tree.document()).to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(tree.kind(children[0]), Some(&NodeKind::Doctype("html".into())));

        let html = tree.document_element().unwrap();
        assert_eq!(tree.tag(html), Some("html"));
        let body = tree.body().unwrap();
        assert_eq!(tree.inner_html(body), "<p>Hello</p>");
    }

    #[test]
    fn test_attributes_keep_source_order() {
        let tree = parse_html(r#"<input type="text" name="guest" required>"#).unwrap();
        let body = tree.body().unwrap();
        let input = tree.element_children(body)[0];
        assert_eq!(tree.describe(input), r#"<input type="text" name="guest" required>"#);
        assert_eq!(tree.attribute(input, "NAME"), Some("guest"));
    }

    #[test]
    fn test_whitespace_between_tags_dropped() {
        let tree = parse_html("<body>\n  <ul>\n    <li>a</li>\n    <li>b</li>\n  </ul>\n</body>").unwrap();
        let body = tree.body().unwrap();
        let ul = tree.element_children(body)[0];
        assert_eq!(tree.children(ul).len(), 2);
        assert_eq!(tree.inner_html(ul), "<li>a</li><li>b</li>");
    }

    #[test]
    fn test_parse_fragment() {
        let mut tree = Tree::new();
        let nodes = parse_fragment(&mut tree, "<b>bold</b> and <i>italic</i>").unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(|&n| tree.parent(n).is_none()));
        assert_eq!(tree.outer_html(nodes[0]), "<b>bold</b>");
        assert_eq!(tree.outer_html(nodes[1]), " and ");

        assert!(parse_fragment(&mut tree, "").unwrap().is_empty());
    }
}
