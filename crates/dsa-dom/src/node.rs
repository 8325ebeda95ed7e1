//! DOM Node - Compact representation
//!
//! Nodes link to each other through `NodeId` indices instead of pointers.
//! A shadow root is an ordinary arena node with no parent; its host keeps
//! the pointer to it and it keeps a pointer back to the host.

use crate::{ClassList, NodeId, ShadowRootData};
use serde::Serialize;

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE for the document, shadow roots and detached nodes)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Text(content.into()))
    }

    /// Create a new comment node
    pub fn comment(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Comment(content.into()))
    }

    /// Create a doctype node
    pub fn doctype(name: impl Into<String>) -> Self {
        Self::with_data(NodeData::Doctype { name: name.into() })
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Create a shadow root node
    pub fn shadow_root(data: ShadowRootData) -> Self {
        Self::with_data(NodeData::ShadowRoot(data))
    }

    /// Coarse classification used by traversal
    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Document => NodeKind::Document,
            NodeData::ShadowRoot(_) => NodeKind::ShadowRoot,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) | NodeData::Doctype { .. } => NodeKind::Other,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get shadow root data if this is a shadow root
    #[inline]
    pub fn as_shadow_root(&self) -> Option<&ShadowRootData> {
        match &self.data {
            NodeData::ShadowRoot(s) => Some(s),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Encapsulated sub-root attached to a host element
    ShadowRoot(ShadowRootData),
    /// DOCTYPE
    Doctype { name: String },
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Node classification exposed through [`crate::ShadowTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    ShadowRoot,
    Element,
    Text,
    Other,
}

impl NodeKind {
    /// Whether nodes of this kind can hold children that queries search
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Document | Self::ShadowRoot | Self::Element)
    }
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Tag name, ASCII-lowercased
    pub tag: String,
    /// Attributes in source order
    pub attrs: Vec<Attribute>,
    /// Attached shadow root (NONE if the element is not a host)
    pub shadow_root: NodeId,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            shadow_root: NodeId::NONE,
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Check if attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Set an attribute, replacing an existing value
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            attr.value = value;
            return;
        }
        self.attrs.push(Attribute::new(name, value));
    }

    /// Parsed `class` attribute
    pub fn class_list(&self) -> ClassList {
        ClassList::from_attr(self.get_attr("class"))
    }

    /// Whether a shadow root is attached
    #[inline]
    pub fn is_host(&self) -> bool {
        self.shadow_root.is_valid()
    }
}

/// Attribute (name is ASCII-lowercased)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            value: value.into(),
        }
    }
}
