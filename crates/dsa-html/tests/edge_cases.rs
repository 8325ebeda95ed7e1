//! Edge case tests for dsa-html
//!
//! Inputs shaped to stress the loader rather than to look like real pages.

use dsa_dom::{NodeId, ShadowTree, find_all};
use dsa_html::parse;

// ============================================================================
// Nesting depth
// ============================================================================

#[test]
fn test_deeply_nested_elements() {
    let depth = 100_000;
    let html = format!("{}<x-button class=\"-primary\"></x-button>", "<div>".repeat(depth));
    let doc = parse(&html).unwrap();
    let tree = doc.tree();

    let buttons = find_all(tree, NodeId::ROOT, "x-button").unwrap();
    assert_eq!(buttons.len(), 1);
    assert!(tree.is_connected(buttons[0]));
    assert_eq!(tree.tag_name(tree.element_parent(buttons[0]).unwrap()), Some("div"));
    assert_eq!(find_all(tree, NodeId::ROOT, "div").unwrap().len(), depth);
}

#[test]
fn test_deeply_nested_shadow_roots() {
    let depth = 500;
    let open = "<x-frame><template shadowrootmode=\"open\">".repeat(depth);
    let close = "</template></x-frame>".repeat(depth);
    let html = format!("{open}<x-button></x-button>{close}");
    let doc = parse(&html).unwrap();
    let tree = doc.tree();

    let button = find_all(tree, NodeId::ROOT, "x-button").unwrap();
    assert_eq!(button.len(), 1);
    assert!(tree.is_connected(button[0]));
    assert!(find_all(tree, NodeId::ROOT, "template").unwrap().is_empty());
}

// ============================================================================
// Document order
// ============================================================================

#[test]
fn test_sibling_order_preserved() {
    let html = "<ul><li id=a></li><li id=b><span></span></li><li id=c></li></ul>";
    let doc = parse(html).unwrap();
    let tree = doc.tree();

    let ids: Vec<&str> = find_all(tree, NodeId::ROOT, "li")
        .unwrap()
        .into_iter()
        .filter_map(|li| tree.attribute(li, "id"))
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}
