//! Native element scan
//!
//! Counts native elements that match named "non-compliant" patterns. The
//! shadow roots of tracked components are not entered: whatever a design
//! system component renders internally is its own business, not ad-hoc
//! markup in the application.

use dsa_dom::{NodeId, SelectorError, SelectorList, ShadowTree, TraversalError, check_root, query_open_matching};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pattern as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativePatternConfig {
    pub name: String,
    pub selector: String,
}

/// A compiled pattern
#[derive(Debug, Clone)]
pub struct NativePattern {
    pub name: String,
    pub selector: SelectorList,
}

impl NativePattern {
    pub fn new(name: &str, selector: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            name: name.to_string(),
            selector: SelectorList::parse(selector)?,
        })
    }
}

/// Matches for one pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeUsage {
    pub name: String,
    pub selector: String,
    pub count: usize,
    pub count_in_open: usize,
    pub count_in_encapsulated: usize,
}

/// Count pattern matches under `root`; patterns with no matches are omitted
///
/// `tracked` holds lowercase component tags whose shadow roots are skipped.
pub fn scan_native<T: ShadowTree + ?Sized>(
    tree: &T,
    root: NodeId,
    patterns: &[NativePattern],
    tracked: &HashSet<String>,
) -> Result<Vec<NativeUsage>, TraversalError> {
    check_root(tree, root)?;

    let mut usages = Vec::new();
    for pattern in patterns {
        let mut open = 0;
        let mut encapsulated = 0;
        scan_scope(tree, root, pattern, tracked, true, &mut open, &mut encapsulated)?;

        if open + encapsulated > 0 {
            tracing::debug!("native {}: {} open, {} encapsulated", pattern.name, open, encapsulated);
            usages.push(NativeUsage {
                name: pattern.name.clone(),
                selector: pattern.selector.to_string(),
                count: open + encapsulated,
                count_in_open: open,
                count_in_encapsulated: encapsulated,
            });
        }
    }
    Ok(usages)
}

fn scan_scope<T: ShadowTree + ?Sized>(
    tree: &T,
    scope: NodeId,
    pattern: &NativePattern,
    tracked: &HashSet<String>,
    is_open: bool,
    open: &mut usize,
    encapsulated: &mut usize,
) -> Result<(), TraversalError> {
    let hits = query_open_matching(tree, scope, &pattern.selector)?.len();
    if is_open {
        *open += hits;
    } else {
        *encapsulated += hits;
    }

    let hosts = std::iter::once(scope).chain(tree.descendant_elements(scope));
    for host in hosts {
        let Some(shadow) = tree.shadow_root(host) else {
            continue;
        };
        let is_component = tree.tag_name(host).is_some_and(|t| tracked.contains(t));
        if !is_component {
            scan_scope(tree, shadow, pattern, tracked, false, open, encapsulated)?;
        }
    }
    Ok(())
}
