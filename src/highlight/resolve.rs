//! Application order for match spans

use super::matcher::MatchSpan;
use std::cmp::Reverse;

/// Order spans for splicing: rightmost first, longer first on equal start,
/// lower keyword index first on equal extent. Nothing is merged or dropped.
///
/// Applying right to left means a split never shifts the offsets of a span
/// still waiting to be applied.
pub fn resolve(mut spans: Vec<MatchSpan>) -> Vec<MatchSpan> {
    spans.sort_by_key(|span| (Reverse(span.start), Reverse(span.end), span.keyword));
    spans
}
