//! DOM Tree (arena-based allocation)

use crate::{Node, NodeData, NodeId, NodeKind, ShadowRootData, ShadowRootMode};

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("Node {0} not found")]
    NotFound(NodeId),
    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("Hierarchy request error: cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Element already has a shadow root
    #[error("Element {0} already has a shadow root")]
    AlreadyAttached(NodeId),
    /// Operation needs an element
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),
}

/// Arena-based DOM tree
///
/// Index 0 is always the document node.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the tree (detached nodes included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node exists from construction
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node::doctype(name))
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let node = self.get_mut(id).ok_or(DomError::NotFound(id))?;
        let elem = node.as_element_mut().ok_or(DomError::NotAnElement(id))?;
        elem.set_attr(name, value);
        Ok(())
    }

    /// Append `child` as the last child of `parent`
    ///
    /// The child is detached from its previous position first. Documents and
    /// shadow roots can never become children, and a node can never be
    /// inserted below itself, shadow boundaries included.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_kind = self.get(parent).ok_or(DomError::NotFound(parent))?.kind();
        let child_kind = self.get(child).ok_or(DomError::NotFound(child))?.kind();

        if !parent_kind.is_container()
            || matches!(child_kind, NodeKind::Document | NodeKind::ShadowRoot)
            || self.would_cycle(parent, child)
        {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child);

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
        Ok(())
    }

    /// Detach a node from its parent; the subtree stays intact
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        if self.get(id).is_none() {
            return Err(DomError::NotFound(id));
        }
        self.detach(id);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Attach an encapsulated sub-root to `host`
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> DomResult<NodeId> {
        let elem = self
            .get(host)
            .ok_or(DomError::NotFound(host))?
            .as_element()
            .ok_or(DomError::NotAnElement(host))?;
        if elem.is_host() {
            return Err(DomError::AlreadyAttached(host));
        }

        let root = self.push(Node::shadow_root(ShadowRootData::new(host, mode)));
        if let Some(elem) = self.nodes[host.index()].as_element_mut() {
            elem.shadow_root = root;
        }
        tracing::trace!("attached shadow root {} to host {}", root, host);
        Ok(root)
    }

    /// Shadow root hosted by `id`, if any
    pub fn shadow_root(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.as_element()?.shadow_root.to_option()
    }

    /// Host element of a shadow root
    pub fn host(&self, shadow_root: NodeId) -> Option<NodeId> {
        self.get(shadow_root)?.as_shadow_root().map(|s| s.host)
    }

    /// Parent within the same tree scope
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.to_option()
    }

    /// Tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    /// Attribute value of an element
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Iterate over direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    /// Whether the node is reachable from the document, hopping from each
    /// shadow root to its host
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = id;
        // Every hop moves to a distinct node, so the arena size bounds the walk.
        for _ in 0..=self.nodes.len() {
            let Some(node) = self.get(current) else {
                return false;
            };
            match &node.data {
                NodeData::Document => return current == NodeId::ROOT,
                NodeData::ShadowRoot(s) => current = s.host,
                _ => current = node.parent,
            }
        }
        false
    }

    /// Whether appending `child` under `parent` would put it below itself
    fn would_cycle(&self, parent: NodeId, child: NodeId) -> bool {
        // A node with no children and no shadow root has no descendants.
        let leaf = self.nodes[child.index()].first_child == NodeId::NONE
            && self.nodes[child.index()].as_element().is_none_or(|e| !e.is_host());
        if leaf {
            return child == parent;
        }
        self.is_shadow_including_inclusive_ancestor(child, parent)
    }

    /// True if `ancestor` is `node` or one of its shadow-including ancestors
    fn is_shadow_including_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        for _ in 0..=self.nodes.len() {
            if current == ancestor {
                return true;
            }
            let Some(n) = self.get(current) else {
                return false;
            };
            current = match &n.data {
                NodeData::ShadowRoot(s) => s.host,
                _ => n.parent,
            };
        }
        false
    }

    /// Text of all descendant text nodes in one scope, concatenated
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(text) = self.get(current).and_then(|n| n.as_text()) {
                out.push_str(text);
            }
            let children: Vec<NodeId> = self.children(current).map(|(c, _)| c).collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Child iterator yielding `(id, node)` pairs
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.to_option()?;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
