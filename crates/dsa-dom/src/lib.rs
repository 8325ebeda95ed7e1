//! dsa DOM - Document Object Model for design-system audits
//!
//! Arena-based DOM tree that models encapsulated (shadow) sub-roots explicitly,
//! plus the queries the auditor runs over it:
//!
//! - [`find_all`] pierces every shadow boundary
//! - [`query_open`] stays inside one tree scope
//! - [`SelectorList`] matches simple compound selectors
//!
//! Everything that reads the tree goes through the [`ShadowTree`] trait so the
//! traversal can run against any tree-like snapshot, not only [`DomTree`].

mod classlist;
mod document;
mod node;
mod selector;
mod shadow;
mod traversal;
mod tree;

pub use classlist::ClassList;
pub use document::Document;
pub use node::{Attribute, ElementData, Node, NodeData, NodeKind};
pub use selector::{AttributeMatcher, AttributeSelector, Compound, SelectorComponent, SelectorError, SelectorList};
pub use shadow::{ShadowRootData, ShadowRootMode};
pub use traversal::{
    ShadowTree, TraversalError, check_root, find_all, find_all_matching, query_first_in_scope, query_open,
    query_open_matching,
};
pub use tree::{Children, DomError, DomResult, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document)
    pub const ROOT: NodeId = NodeId(0);
    /// Invalid/null node ID
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#none")
        }
    }
}
