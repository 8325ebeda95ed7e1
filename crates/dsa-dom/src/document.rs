//! Document - one loaded page snapshot

use crate::{DomTree, NodeId};

/// A page's DOM tree plus the address it was loaded from
#[derive(Debug, Default)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL (or file path for local snapshots)
    url: String,
}

impl Document {
    /// Create an empty document
    pub fn new(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The `<html>` element, if present
    pub fn document_element(&self) -> Option<NodeId> {
        self.tree
            .children(self.tree.root())
            .find(|(_, node)| node.is_element())
            .map(|(id, _)| id)
    }

    /// Text of the first `<title>` in the open tree
    pub fn title(&self) -> String {
        let mut stack = vec![self.tree.root()];
        while let Some(id) = stack.pop() {
            if self.tree.tag_name(id) == Some("title") {
                return self.tree.text_content(id).trim().to_string();
            }
            let children: Vec<NodeId> = self.tree.children(id).map(|(c, _)| c).collect();
            stack.extend(children.into_iter().rev());
        }
        String::new()
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_document_element() {
        let mut doc = Document::new("file:///page.html");
        let tree = doc.tree_mut();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let title = tree.create_element("title");
        let text = tree.create_text("  Settings ");
        tree.append_child(tree.root(), html).unwrap();
        tree.append_child(html, head).unwrap();
        tree.append_child(head, title).unwrap();
        tree.append_child(title, text).unwrap();

        assert_eq!(doc.url(), "file:///page.html");
        assert_eq!(doc.document_element(), Some(html));
        assert_eq!(doc.title(), "Settings");
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::default();
        assert_eq!(doc.document_element(), None);
        assert_eq!(doc.title(), "");
    }
}
