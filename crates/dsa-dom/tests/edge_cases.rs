//! Edge case and stress tests for dsa-dom
//!
//! Bad roots, hierarchy violations and degenerate trees.

use dsa_dom::{DomError, DomTree, NodeId, SelectorError, SelectorList, ShadowRootMode, TraversalError, find_all, query_open};

// ============================================================================
// QUERY ROOTS
// ============================================================================

#[test]
fn test_detached_root_fails_fast() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    let child = tree.create_element("x-button");
    tree.append_child(div, child).unwrap();

    assert_eq!(find_all(&tree, div, "x-button"), Err(TraversalError::Detached(div)));
    assert_eq!(query_open(&tree, div, "x-button"), Err(TraversalError::Detached(div)));
}

#[test]
fn test_removed_subtree_becomes_detached() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    tree.append_child(tree.root(), div).unwrap();
    assert!(find_all(&tree, div, "x-button").is_ok());

    tree.remove(div).unwrap();
    assert_eq!(find_all(&tree, div, "x-button"), Err(TraversalError::Detached(div)));
}

#[test]
fn test_shadow_of_detached_host_is_detached() {
    let mut tree = DomTree::new();
    let host = tree.create_element("x-panel");
    let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();

    assert!(!tree.is_connected(shadow));
    assert_eq!(find_all(&tree, shadow, "x-button"), Err(TraversalError::Detached(shadow)));
}

#[test]
fn test_unknown_and_leaf_roots() {
    let mut tree = DomTree::new();
    let text = tree.create_text("hello");
    tree.append_child(tree.root(), text).unwrap();

    assert_eq!(find_all(&tree, NodeId::NONE, "a"), Err(TraversalError::InvalidRoot(NodeId::NONE)));
    assert_eq!(find_all(&tree, text, "a"), Err(TraversalError::NotAContainer(text)));
}

#[test]
fn test_missing_tag_is_empty_not_error() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    tree.append_child(tree.root(), div).unwrap();

    assert_eq!(find_all(&tree, tree.root(), "x-nowhere").unwrap(), Vec::<NodeId>::new());
}

// ============================================================================
// HIERARCHY
// ============================================================================

#[test]
fn test_cycle_through_shadow_rejected() {
    let mut tree = DomTree::new();
    let outer = tree.create_element("x-outer");
    tree.append_child(tree.root(), outer).unwrap();
    let shadow = tree.attach_shadow(outer, ShadowRootMode::Open).unwrap();
    let inner = tree.create_element("x-inner");
    tree.append_child(shadow, inner).unwrap();

    // outer would end up inside its own shadow tree
    let result = tree.append_child(inner, outer);
    assert_eq!(result, Err(DomError::HierarchyRequest { parent: inner, child: outer }));
    assert_eq!(tree.parent(outer), Some(tree.root()));
}

#[test]
fn test_roots_cannot_be_children() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    tree.append_child(tree.root(), div).unwrap();
    let shadow = tree.attach_shadow(div, ShadowRootMode::Open).unwrap();
    let other = tree.create_element("span");
    tree.append_child(tree.root(), other).unwrap();

    assert!(tree.append_child(other, shadow).is_err());
    assert!(tree.append_child(div, tree.root()).is_err());
}

#[test]
fn test_second_shadow_rejected() {
    let mut tree = DomTree::new();
    let host = tree.create_element("x-card");
    tree.attach_shadow(host, ShadowRootMode::Open).unwrap();

    assert_eq!(
        tree.attach_shadow(host, ShadowRootMode::Closed),
        Err(DomError::AlreadyAttached(host))
    );
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn test_deep_shadow_nesting() {
    let mut tree = DomTree::new();
    let mut scope = tree.root();
    for _ in 0..200 {
        let host = tree.create_element("x-shell");
        tree.append_child(scope, host).unwrap();
        scope = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    }
    let leaf = tree.create_element("x-button");
    tree.append_child(scope, leaf).unwrap();

    assert_eq!(find_all(&tree, tree.root(), "x-button").unwrap(), vec![leaf]);
    assert_eq!(find_all(&tree, tree.root(), "x-shell").unwrap().len(), 200);
}

#[test]
fn test_wide_tree() {
    let mut tree = DomTree::new();
    let list = tree.create_element("ul");
    tree.append_child(tree.root(), list).unwrap();
    for _ in 0..5_000 {
        let item = tree.create_element("x-list-item");
        tree.append_child(list, item).unwrap();
    }

    assert_eq!(find_all(&tree, tree.root(), "X-LIST-ITEM").unwrap().len(), 5_000);
}

// ============================================================================
// SELECTORS
// ============================================================================

#[test]
fn test_unsupported_selectors() {
    for input in ["div span", "a > b", "a:hover", "::before"] {
        assert!(
            matches!(SelectorList::parse(input), Err(SelectorError::Unsupported { .. })),
            "{input} should be rejected"
        );
    }
    assert_eq!(SelectorList::parse("  "), Err(SelectorError::Empty));
    assert_eq!(SelectorList::parse("a,,b"), Err(SelectorError::Empty));
    assert!(matches!(SelectorList::parse("[class^=\"btn]"), Err(SelectorError::Unclosed { .. })));
}
