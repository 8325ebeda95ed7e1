//! Shadow-piercing traversal
//!
//! A query scoped to one tree (the document or a single shadow root) never
//! sees inside encapsulated sub-roots. [`find_all`] runs the scoped query,
//! then repeats it inside every shadow root hosted in that scope, depth-first,
//! in host document order. Matches of the current scope always come before
//! matches contributed by its sub-roots.

use crate::{Attribute, DomTree, NodeId, NodeKind, SelectorList};

/// Read-only view of a tree with encapsulated sub-roots
///
/// This is the seam between the audit core and whatever produced the DOM
/// snapshot. Only the required methods touch storage; everything else is
/// derived from them.
pub trait ShadowTree {
    /// Classification of a node, `None` if the id is unknown
    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;

    /// First child within the same tree scope
    fn first_child(&self, node: NodeId) -> Option<NodeId>;

    /// Next sibling within the same tree scope
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Parent within the same tree scope (`None` for document and shadow roots)
    fn parent_node(&self, node: NodeId) -> Option<NodeId>;

    /// Normalized (lowercase) tag name of an element
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    /// Attributes of an element; empty for other nodes
    fn attributes(&self, node: NodeId) -> &[Attribute];

    /// Shadow root hosted by an element
    fn shadow_root(&self, node: NodeId) -> Option<NodeId>;

    /// Whether the node is reachable from the document
    fn is_connected(&self, node: NodeId) -> bool;

    /// Attribute value by name (ASCII case-insensitive)
    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attributes(node)
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Whether the node is an element
    fn is_element(&self, node: NodeId) -> bool {
        self.node_kind(node) == Some(NodeKind::Element)
    }

    /// Nearest element ancestor in the same tree scope
    fn element_parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_node(node).filter(|&p| self.is_element(p))
    }

    /// Descendant elements of `node` in document order, without crossing
    /// into any shadow root (the node itself excluded)
    fn descendant_elements(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        push_children_reversed(self, node, &mut stack);
        while let Some(current) = stack.pop() {
            if self.is_element(current) {
                out.push(current);
            }
            push_children_reversed(self, current, &mut stack);
        }
        out
    }
}

fn push_children_reversed<T: ShadowTree + ?Sized>(tree: &T, node: NodeId, stack: &mut Vec<NodeId>) {
    let start = stack.len();
    let mut child = tree.first_child(node);
    while let Some(id) = child {
        stack.push(id);
        child = tree.next_sibling(id);
    }
    stack[start..].reverse();
}

impl ShadowTree for DomTree {
    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.get(node).map(|n| n.kind())
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.first_child.to_option()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.next_sibling.to_option()
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        DomTree::tag_name(self, node)
    }

    fn attributes(&self, node: NodeId) -> &[Attribute] {
        self.get(node)
            .and_then(|n| n.as_element())
            .map(|e| e.attrs.as_slice())
            .unwrap_or(&[])
    }

    fn shadow_root(&self, node: NodeId) -> Option<NodeId> {
        DomTree::shadow_root(self, node)
    }

    fn is_connected(&self, node: NodeId) -> bool {
        DomTree::is_connected(self, node)
    }
}

/// Traversal errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraversalError {
    /// Root id does not exist in the tree
    #[error("Traversal root {0} does not exist")]
    InvalidRoot(NodeId),
    /// Root exists but is not connected to the document
    #[error("Traversal root {0} is detached from the document")]
    Detached(NodeId),
    /// Root cannot have descendants (text, comment, doctype)
    #[error("Traversal root {0} is not a document, shadow root or element")]
    NotAContainer(NodeId),
}

/// Validate a query root: it must exist, hold children and be connected
pub fn check_root<T: ShadowTree + ?Sized>(tree: &T, root: NodeId) -> Result<(), TraversalError> {
    let kind = tree.node_kind(root).ok_or(TraversalError::InvalidRoot(root))?;
    if !kind.is_container() {
        return Err(TraversalError::NotAContainer(root));
    }
    if !tree.is_connected(root) {
        return Err(TraversalError::Detached(root));
    }
    Ok(())
}

/// Every element named `tag` under `root`, shadow roots included
///
/// Matching is ASCII case-insensitive against the normalized tag name.
/// A root that is itself a host has its own shadow root searched first
/// among the sub-roots, since it precedes every descendant host.
pub fn find_all<T: ShadowTree + ?Sized>(tree: &T, root: NodeId, tag: &str) -> Result<Vec<NodeId>, TraversalError> {
    check_root(tree, root)?;
    let mut out = Vec::new();
    collect(tree, root, &|t: &T, n: NodeId| tag_matches(t, n, tag), &mut out);
    tracing::trace!("find_all({}, {:?}) -> {} matches", root, tag, out.len());
    Ok(out)
}

/// Every element under `root` matching `selector`, shadow roots included
pub fn find_all_matching<T: ShadowTree + ?Sized>(
    tree: &T,
    root: NodeId,
    selector: &SelectorList,
) -> Result<Vec<NodeId>, TraversalError> {
    check_root(tree, root)?;
    let mut out = Vec::new();
    collect(tree, root, &|t: &T, n: NodeId| selector.matches(t, n), &mut out);
    Ok(out)
}

/// Elements named `tag` in the same tree scope as `root` (no shadow crossing)
pub fn query_open<T: ShadowTree + ?Sized>(tree: &T, root: NodeId, tag: &str) -> Result<Vec<NodeId>, TraversalError> {
    check_root(tree, root)?;
    Ok(tree
        .descendant_elements(root)
        .into_iter()
        .filter(|&n| tag_matches(tree, n, tag))
        .collect())
}

/// Elements matching `selector` in the same tree scope as `root`
pub fn query_open_matching<T: ShadowTree + ?Sized>(
    tree: &T,
    root: NodeId,
    selector: &SelectorList,
) -> Result<Vec<NodeId>, TraversalError> {
    check_root(tree, root)?;
    Ok(tree
        .descendant_elements(root)
        .into_iter()
        .filter(|&n| selector.matches(tree, n))
        .collect())
}

/// First element in `scope` matching `selector`, in document order
///
/// Like `querySelector` on a shadow root: nested shadow roots are not entered.
pub fn query_first_in_scope<T: ShadowTree + ?Sized>(tree: &T, scope: NodeId, selector: &SelectorList) -> Option<NodeId> {
    tree.descendant_elements(scope)
        .into_iter()
        .find(|&n| selector.matches(tree, n))
}

fn tag_matches<T: ShadowTree + ?Sized>(tree: &T, node: NodeId, tag: &str) -> bool {
    tree.tag_name(node).is_some_and(|t| t.eq_ignore_ascii_case(tag))
}

fn collect<T, F>(tree: &T, scope: NodeId, matches: &F, out: &mut Vec<NodeId>)
where
    T: ShadowTree + ?Sized,
    F: Fn(&T, NodeId) -> bool,
{
    let descendants = tree.descendant_elements(scope);
    out.extend(descendants.iter().copied().filter(|&n| matches(tree, n)));

    let own_shadow = tree.shadow_root(scope);
    let nested = descendants.iter().filter_map(|&n| tree.shadow_root(n));
    for shadow in own_shadow.into_iter().chain(nested) {
        collect(tree, shadow, matches, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShadowRootMode;

    fn append(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
        let id = tree.create_element(tag);
        tree.append_child(parent, id).unwrap();
        id
    }

    #[test]
    fn test_empty_root_returns_empty() {
        let tree = DomTree::new();
        assert_eq!(find_all(&tree, tree.root(), "x-widget").unwrap(), Vec::<NodeId>::new());
    }

    #[test]
    fn test_open_matches_precede_shadow_matches() {
        let mut tree = DomTree::new();
        let host = append(&mut tree, NodeId::ROOT, "x-panel");
        let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let inner = append(&mut tree, shadow, "x-button");
        let outer = append(&mut tree, NodeId::ROOT, "x-button");

        assert_eq!(find_all(&tree, tree.root(), "x-button").unwrap(), vec![outer, inner]);
        assert_eq!(query_open(&tree, tree.root(), "x-button").unwrap(), vec![outer]);
    }

    #[test]
    fn test_sub_roots_in_host_order() {
        let mut tree = DomTree::new();
        let a = append(&mut tree, NodeId::ROOT, "x-a");
        let b = append(&mut tree, NodeId::ROOT, "x-b");
        let sb = tree.attach_shadow(b, ShadowRootMode::Open).unwrap();
        let sa = tree.attach_shadow(a, ShadowRootMode::Closed).unwrap();
        let in_b = append(&mut tree, sb, "x-item");
        let in_a = append(&mut tree, sa, "x-item");

        assert_eq!(find_all(&tree, tree.root(), "X-ITEM").unwrap(), vec![in_a, in_b]);
    }

    #[test]
    fn test_root_host_searches_own_shadow() {
        let mut tree = DomTree::new();
        let host = append(&mut tree, NodeId::ROOT, "x-shell");
        let light = append(&mut tree, host, "x-item");
        let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let inner = append(&mut tree, shadow, "x-item");

        assert_eq!(find_all(&tree, host, "x-item").unwrap(), vec![light, inner]);
    }

    #[test]
    fn test_invalid_roots() {
        let mut tree = DomTree::new();
        let detached = tree.create_element("div");
        let text = tree.create_text("t");
        tree.append_child(tree.root(), text).unwrap();

        assert_eq!(find_all(&tree, NodeId(999), "div"), Err(TraversalError::InvalidRoot(NodeId(999))));
        assert_eq!(find_all(&tree, detached, "div"), Err(TraversalError::Detached(detached)));
        assert_eq!(find_all(&tree, text, "div"), Err(TraversalError::NotAContainer(text)));
        assert_eq!(query_open(&tree, NodeId::NONE, "div"), Err(TraversalError::InvalidRoot(NodeId::NONE)));
    }

    #[test]
    fn test_query_first_in_scope_does_not_pierce() {
        let mut tree = DomTree::new();
        let host = append(&mut tree, NodeId::ROOT, "x-field");
        let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let wrapper = append(&mut tree, shadow, "x-inner");
        let nested = tree.attach_shadow(wrapper, ShadowRootMode::Open).unwrap();
        append(&mut tree, nested, "input");

        let selector = SelectorList::parse("input").unwrap();
        assert_eq!(query_first_in_scope(&tree, shadow, &selector), None);
        assert_eq!(find_all_matching(&tree, tree.root(), &selector).unwrap().len(), 1);
    }

    #[test]
    fn test_query_open_matching_stays_in_scope() {
        let mut tree = DomTree::new();
        let plain = append(&mut tree, NodeId::ROOT, "button");
        let host = append(&mut tree, NodeId::ROOT, "x-toolbar");
        let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let inner = append(&mut tree, shadow, "button");

        let selector = SelectorList::parse("button").unwrap();
        assert_eq!(query_open_matching(&tree, tree.root(), &selector).unwrap(), vec![plain]);
        assert_eq!(query_open_matching(&tree, shadow, &selector).unwrap(), vec![inner]);
        let orphan = tree.create_element("button");
        assert_eq!(
            query_open_matching(&tree, orphan, &selector),
            Err(TraversalError::Detached(orphan))
        );
    }

    #[test]
    fn test_element_parent_stops_at_scope() {
        let mut tree = DomTree::new();
        let host = append(&mut tree, NodeId::ROOT, "x-panel");
        let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let top = append(&mut tree, shadow, "x-button");
        let section = append(&mut tree, shadow, "section");
        let deep = append(&mut tree, section, "x-button");

        assert_eq!(tree.element_parent(top), None);
        assert_eq!(tree.element_parent(deep), Some(section));
        assert_eq!(tree.element_parent(host), None);
    }
}
