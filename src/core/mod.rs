//! Core markup reading primitives
//!
//! The building blocks the document builder runs on:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Tokenizer: lenient pull tokenizer for HTML-ish message markup
//! - Entities: character reference decoding/escaping with Cow (zero-copy when possible)
//! - Attributes: attribute parsing from start tags

pub mod attributes;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
