//! Text flattening
//!
//! Collects the rendered text under a root as an ordered list of segments,
//! one per text node, plus their concatenation. Offsets into the flattened
//! text are what the matcher and splicer speak.

use super::is_marker;
use crate::config::EngineConfig;
use crate::dom::{Document, NodeId, NodeKind};

/// One text node's contribution to the flattened text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    /// Text node that owns the content
    pub owner: NodeId,
    /// Byte offset of `content` in the flattened text
    pub start: usize,
    pub content: String,
}

impl TextSegment {
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.content.len()
    }
}

/// Segments plus their concatenation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flattened {
    pub segments: Vec<TextSegment>,
    pub text: String,
}

/// How the flattener treats a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Text node with visible content
    TextLeaf,
    /// Skipped together with its subtree
    Opaque,
    /// Element whose children are visited
    Container,
}

/// Classify a node for flattening
pub fn classify(doc: &Document, id: NodeId, config: &EngineConfig) -> NodeClass {
    let Some(node) = doc.get(id) else {
        return NodeClass::Opaque;
    };
    match node.kind {
        NodeKind::Text if node.data.trim().is_empty() => NodeClass::Opaque,
        NodeKind::Text => NodeClass::TextLeaf,
        NodeKind::Element => {
            let name = doc.node_name(id).unwrap_or("");
            if config.is_opaque_tag(name) || is_marker(doc, id, config) {
                NodeClass::Opaque
            } else {
                NodeClass::Container
            }
        }
        NodeKind::Document => NodeClass::Container,
        NodeKind::Comment | NodeKind::Declaration => NodeClass::Opaque,
    }
}

/// Flatten the rendered text under `root` (root itself excluded)
pub fn flatten(doc: &Document, root: NodeId, config: &EngineConfig) -> Flattened {
    let mut flat = Flattened::default();

    // Explicit stack, children pushed in reverse so the first child pops first
    let mut stack: Vec<NodeId> = Vec::with_capacity(32);
    push_children(doc, root, &mut stack);

    while let Some(id) = stack.pop() {
        match classify(doc, id, config) {
            NodeClass::TextLeaf => {
                let content = doc.text(id).unwrap_or("").to_string();
                flat.text.push_str(&content);
                flat.segments.push(TextSegment {
                    owner: id,
                    start: flat.text.len() - content.len(),
                    content,
                });
            }
            NodeClass::Container => push_children(doc, id, &mut stack),
            NodeClass::Opaque => {}
        }
    }

    flat
}

fn push_children(doc: &Document, id: NodeId, stack: &mut Vec<NodeId>) {
    let mut child = doc.get(id).and_then(|n| n.last_child);
    while let Some(cid) = child {
        stack.push(cid);
        child = doc.get(cid).and_then(|n| n.prev_sibling);
    }
}
