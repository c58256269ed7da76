//! Error types
//!
//! Highlighting never fails outright: each variant of `HighlightError` marks a
//! point where a pass degrades (fewer or no highlights) and logs instead.
//! `ConfigError` is the one error handed back to the host.

use crate::dom::NodeId;
use std::fmt;

/// Recoverable conditions met during a highlight pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// The keyword store could not be read; the pass runs with no keywords
    StoreUnavailable(String),
    /// No watched body element is visible; the pass is skipped
    NoVisibleRoot,
    /// A span with `end <= start` or outside the flattened text
    DegenerateSpan { start: usize, end: usize },
    /// A text node changed or left the root between flattening and splicing
    DetachedNode(NodeId),
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::StoreUnavailable(reason) => {
                write!(f, "keyword store unavailable: {}", reason)
            }
            HighlightError::NoVisibleRoot => write!(f, "no visible message body"),
            HighlightError::DegenerateSpan { start, end } => {
                write!(f, "degenerate span [{}, {})", start, end)
            }
            HighlightError::DetachedNode(id) => write!(f, "text node {} is detached", id),
        }
    }
}

impl std::error::Error for HighlightError {}

/// Keyword store failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing storage cannot be reached (e.g. a poisoned lock)
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(reason) => write!(f, "store unavailable: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for HighlightError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => HighlightError::StoreUnavailable(reason),
        }
    }
}

/// Invalid host configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownKey(String),
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownKey(key) => write!(f, "unknown option: {}", key),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            HighlightError::DegenerateSpan { start: 4, end: 4 }.to_string(),
            "degenerate span [4, 4)"
        );
        assert_eq!(
            ConfigError::UnknownKey("colour".into()).to_string(),
            "unknown option: colour"
        );
    }

    #[test]
    fn test_store_error_converts() {
        let err: HighlightError = StoreError::Unavailable("poisoned".into()).into();
        assert_eq!(err, HighlightError::StoreUnavailable("poisoned".into()));
    }
}
