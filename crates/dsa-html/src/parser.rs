//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the arena DOM.

use crate::ParseError;
use dsa_dom::{Document, DomTree, NodeId, ShadowRootMode};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
pub struct HtmlParser {
    /// Attach `<template shadowrootmode>` contents as shadow roots
    declarative_shadow: bool,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self {
            declarative_shadow: true,
        }
    }

    /// Keep declarative shadow templates as plain `<template>` elements
    pub fn without_declarative_shadow(mut self) -> Self {
        self.declarative_shadow = false;
        self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, ParseError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::new(url);
        let root = document.tree().root();
        self.convert(&dom.document, document.tree_mut(), root)?;

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Convert an RcDom subtree to our DOM format
    ///
    /// Works from an explicit stack so nesting depth never reaches the call
    /// stack. Children are pushed in reverse to keep document order.
    fn convert(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), ParseError> {
        let mut stack: Vec<(Handle, NodeId)> = vec![(handle.clone(), parent)];

        while let Some((handle, parent)) = stack.pop() {
            match &handle.data {
                RcNodeData::Document => {
                    push_children(&mut stack, &handle, parent);
                }
                RcNodeData::Doctype { name, .. } => {
                    let id = tree.create_doctype(name);
                    tree.append_child(parent, id)?;
                }
                RcNodeData::Text { contents } => {
                    let text = contents.borrow().to_string();
                    if !text.trim().is_empty() {
                        let id = tree.create_text(&text);
                        tree.append_child(parent, id)?;
                    }
                }
                RcNodeData::Comment { contents } => {
                    let id = tree.create_comment(contents);
                    tree.append_child(parent, id)?;
                }
                RcNodeData::Element {
                    name,
                    attrs,
                    template_contents,
                    ..
                } => {
                    let attrs = attrs.borrow();

                    if self.declarative_shadow && name.local.as_ref() == "template" {
                        let mode = attrs
                            .iter()
                            .find(|a| a.name.local.as_ref() == "shadowrootmode")
                            .and_then(|a| a.value.parse::<ShadowRootMode>().ok());
                        let can_host = tree.get(parent).and_then(|n| n.as_element()).is_some_and(|e| !e.is_host());

                        if let (Some(mode), true) = (mode, can_host) {
                            let shadow = tree.attach_shadow(parent, mode)?;
                            if let Some(contents) = template_contents.borrow().as_ref() {
                                push_children(&mut stack, contents, shadow);
                            }
                            continue;
                        }
                    }

                    let id = tree.create_element(&name.local);
                    for attr in attrs.iter() {
                        tree.set_attribute(id, &attr.name.local, &attr.value)?;
                    }
                    tree.append_child(parent, id)?;

                    // Inert template contents are not part of the queried tree.
                    if template_contents.borrow().is_none() {
                        push_children(&mut stack, &handle, id);
                    }
                }
                RcNodeData::ProcessingInstruction { .. } => {}
            }
        }
        Ok(())
    }
}

fn push_children(stack: &mut Vec<(Handle, NodeId)>, handle: &Handle, parent: NodeId) {
    stack.extend(handle.children.borrow().iter().rev().map(|child| (child.clone(), parent)));
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsa_dom::{ShadowTree, find_all, query_open};

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html).unwrap();

        assert!(doc.tree().len() > 1, "Expected more than 1 node, got {}", doc.tree().len());
        assert_eq!(doc.title(), "Test");
    }

    #[test]
    fn test_declarative_shadow_root() {
        let html = r#"<body><x-panel><template shadowrootmode="open"><x-button class="-primary"></x-button></template></x-panel></body>"#;
        let doc = HtmlParser::new().parse(html).unwrap();
        let tree = doc.tree();

        let panels = query_open(tree, tree.root(), "x-panel").unwrap();
        assert_eq!(panels.len(), 1);
        assert!(tree.shadow_root(panels[0]).is_some());
        assert!(query_open(tree, tree.root(), "template").unwrap().is_empty());
        assert!(query_open(tree, tree.root(), "x-button").unwrap().is_empty());
        assert_eq!(find_all(tree, tree.root(), "x-button").unwrap().len(), 1);
    }

    #[test]
    fn test_declarative_shadow_disabled() {
        let html = r#"<x-panel><template shadowrootmode="open"><x-button></x-button></template></x-panel>"#;
        let doc = HtmlParser::new().without_declarative_shadow().parse(html).unwrap();
        let tree = doc.tree();

        assert_eq!(query_open(tree, tree.root(), "template").unwrap().len(), 1);
        assert!(find_all(tree, tree.root(), "x-button").unwrap().is_empty());
    }

    #[test]
    fn test_attributes_preserved() {
        let html = r#"<x-button variant="primary" size="lg" disabled></x-button>"#;
        let doc = HtmlParser::new().parse(html).unwrap();
        let tree = doc.tree();
        let button = find_all(tree, tree.root(), "x-button").unwrap()[0];

        let names: Vec<&str> = tree.attributes(button).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["variant", "size", "disabled"]);
        assert_eq!(tree.attribute(button, "disabled"), Some(""));
    }
}
