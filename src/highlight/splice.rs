//! Node splicing
//!
//! Maps match spans in flattened text back onto the text nodes that hold
//! them, splitting nodes at span boundaries and wrapping the matched part in
//! a marker element. Only text nodes are split and only markers are added,
//! so the rendered text never changes.

use super::flatten::TextSegment;
use super::matcher::MatchSpan;
use crate::config::EngineConfig;
use crate::dom::{Document, NodeId};
use crate::error::HighlightError;

/// A run of flattened text owned by one text node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    start: usize,
    end: usize,
    node: NodeId,
    /// Already inside a marker; never wrapped again
    wrapped: bool,
}

impl Piece {
    #[inline]
    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Applies resolved spans to a document, one at a time.
///
/// Holds a piece list that starts as one piece per segment and is updated
/// after every split, so each span sees the current node layout.
pub struct Splicer<'c> {
    root: NodeId,
    pieces: Vec<Piece>,
    text_len: usize,
    config: &'c EngineConfig,
}

impl<'c> Splicer<'c> {
    pub fn new(root: NodeId, segments: &[TextSegment], text_len: usize, config: &'c EngineConfig) -> Self {
        let pieces = segments
            .iter()
            .map(|segment| Piece {
                start: segment.start,
                end: segment.end(),
                node: segment.owner,
                wrapped: false,
            })
            .collect();
        Splicer {
            root,
            pieces,
            text_len,
            config,
        }
    }

    /// Wrap the unwrapped text covered by `span`.
    ///
    /// Returns the number of markers inserted, which is zero when every
    /// covered character is already highlighted. Pieces whose node went
    /// stale are skipped and logged; the rest of the span still applies.
    pub fn apply(&mut self, doc: &mut Document, span: &MatchSpan) -> Result<usize, HighlightError> {
        if span.end <= span.start || span.start >= self.text_len {
            return Err(HighlightError::DegenerateSpan {
                start: span.start,
                end: span.end,
            });
        }
        let start = span.start;
        let end = span.end.min(self.text_len);

        let mut hits = Vec::new();
        for (index, piece) in self.pieces.iter().enumerate() {
            if piece.start >= end {
                break;
            }
            if piece.end > start && !piece.wrapped {
                hits.push(index);
            }
        }

        // Right to left keeps the indices of pieces still to visit valid
        let mut inserted = 0;
        for &index in hits.iter().rev() {
            let piece = self.pieces[index];
            let local_start = start.max(piece.start) - piece.start;
            let local_end = end.min(piece.end) - piece.start;

            match self.wrap_piece(doc, piece, local_start, local_end) {
                Ok(replacement) => {
                    if replacement.iter().any(|p| p.wrapped) {
                        inserted += 1;
                    }
                    self.pieces.splice(index..=index, replacement);
                }
                Err(err) => tracing::debug!(%err, "skipping text node"),
            }
        }

        Ok(inserted)
    }

    /// Split one piece's node around `[local_start, local_end)` and wrap the
    /// middle. Returns the pieces replacing it.
    ///
    /// Every check happens before the first write. The returned pieces
    /// describe the nodes as they are afterwards, even if a write was refused.
    fn wrap_piece(
        &self,
        doc: &mut Document,
        piece: Piece,
        local_start: usize,
        local_end: usize,
    ) -> Result<Vec<Piece>, HighlightError> {
        if !doc.contains(self.root, piece.node) || piece.node == self.root {
            return Err(HighlightError::DetachedNode(piece.node));
        }
        match doc.text(piece.node) {
            Some(text)
                if text.len() == piece.len()
                    && text.is_char_boundary(local_start)
                    && text.is_char_boundary(local_end) => {}
            _ => return Err(HighlightError::DetachedNode(piece.node)),
        }

        // Split the tail off first so `piece.node` keeps the leading text
        let after = if local_end < piece.len() {
            doc.split_text(piece.node, local_end)
        } else {
            None
        };
        let head_end = if after.is_some() || local_end == piece.len() {
            piece.start + local_end
        } else {
            piece.end
        };
        let matched = if local_start > 0 {
            doc.split_text(piece.node, local_start)
        } else {
            Some(piece.node)
        };

        let mut replacement = Vec::with_capacity(3);
        match matched {
            Some(node) => {
                if node != piece.node {
                    replacement.push(Piece {
                        end: piece.start + local_start,
                        ..piece
                    });
                }
                // Never wrap past the span when the tail stayed attached
                let wrapped = head_end == piece.start + local_end && {
                    let marker = doc.create_element(&self.config.marker_tag);
                    doc.set_attribute(marker, "class", &self.config.marker_class);
                    doc.wrap(node, marker)
                };
                replacement.push(Piece {
                    start: piece.start + local_start,
                    end: head_end,
                    node,
                    wrapped,
                });
            }
            None => replacement.push(Piece { end: head_end, ..piece }),
        }
        if let Some(after) = after {
            replacement.push(Piece {
                start: piece.start + local_end,
                end: piece.end,
                node: after,
                wrapped: false,
            });
        }
        if !replacement.iter().any(|p| p.wrapped) {
            tracing::debug!(node = piece.node, "text node split but not wrapped");
        }
        Ok(replacement)
    }

    /// Current piece layout as `(start, end, wrapped)`
    #[cfg(test)]
    fn layout(&self) -> Vec<(usize, usize, bool)> {
        self.pieces.iter().map(|p| (p.start, p.end, p.wrapped)).collect()
    }
}
