//! DOM Module - Arena-based mutable document
//!
//! Implements a live document the highlighter edits in place:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - String interning for element/attribute names
//! - A mutation journal for change observers

pub mod document;
pub mod mutation;
pub mod node;
pub mod serialize;
pub mod strings;

pub use document::Document;
pub use mutation::Mutation;
pub use node::{NodeId, NodeKind, DOCUMENT_NODE};
pub use serialize::{inner_markup, outer_markup};
