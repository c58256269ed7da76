//! Document Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// The document node always sits at index 0
pub const DOCUMENT_NODE: NodeId = 0;

/// Type of document node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element,
    /// Text content
    Text,
    /// Comment
    Comment,
    /// `<!DOCTYPE ...>` or another declaration
    Declaration,
}

/// A node in the arena
///
/// Detached nodes keep their slot; a NodeId stays valid for the lifetime of
/// the document, it just stops being reachable from the document node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Type of this node
    pub kind: NodeKind,
    /// Parent node (None for the document node and detached nodes)
    pub parent: Option<NodeId>,
    /// First child node
    pub first_child: Option<NodeId>,
    /// Last child node
    pub last_child: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Index into string pool for the element name, or 0
    pub name_id: u32,
    /// Character data for text, comment and declaration nodes
    pub data: String,
    /// Element attributes in source order
    pub attributes: Vec<NodeAttribute>,
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Node {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id: 0,
            data: String::new(),
            attributes: Vec::new(),
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        Self::with_kind(NodeKind::Document)
    }

    /// Create a new (detached) element node
    pub fn element(name_id: u32) -> Self {
        Node {
            name_id,
            ..Self::with_kind(NodeKind::Element)
        }
    }

    /// Create a new (detached) text node
    pub fn text(data: String) -> Self {
        Node {
            data,
            ..Self::with_kind(NodeKind::Text)
        }
    }

    /// Create a new (detached) comment node
    pub fn comment(data: String) -> Self {
        Node {
            data,
            ..Self::with_kind(NodeKind::Comment)
        }
    }

    /// Create a new (detached) declaration node
    pub fn declaration(data: String) -> Self {
        Node {
            data,
            ..Self::with_kind(NodeKind::Declaration)
        }
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Check if this is a text node
    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }
}

/// Stored element attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAttribute {
    /// Index into string pool for attribute name
    pub name_id: u32,
    /// Attribute value (references already decoded)
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_are_detached() {
        for node in [Node::element(3), Node::text("x".into()), Node::comment("c".into())] {
            assert!(node.parent.is_none());
            assert!(node.first_child.is_none());
        }
    }

    #[test]
    fn test_kind_helpers() {
        assert!(Node::element(1).is_element());
        assert!(Node::text("hi".into()).is_text());
        assert!(!Node::document().is_text());
    }
}
