//! Cross-node keyword highlighting
//!
//! - Flatten: rendered text of a subtree as ordered text segments
//! - Matcher: case-insensitive keyword spans over the flattened text
//! - Resolve: right-to-left application order
//! - Splice: split text nodes and wrap matched runs in markers
//! - Clean: unwrap markers and merge the text back together
//! - Engine: one full pass, and the store/probe-bound `Highlighter`

pub mod clean;
pub mod engine;
pub mod flatten;
pub mod matcher;
pub mod resolve;
pub mod splice;

pub use engine::{clear, Highlighter, PassReport};
pub use flatten::flatten;

use crate::config::EngineConfig;
use crate::dom::{Document, NodeId};

/// Check whether a node is a marker this engine inserted
pub fn is_marker(doc: &Document, id: NodeId, config: &EngineConfig) -> bool {
    doc.node_name(id) == Some(config.marker_tag.as_str()) && doc.has_class(id, &config.marker_class)
}
