//! Highlight pass
//!
//! One pass is Clean → Flatten → Match → Resolve → Splice on a single root,
//! made with the mutation journal suspended so the pass never observes its
//! own writes.

use super::clean::clean;
use super::flatten::flatten;
use super::matcher::compiled;
use super::resolve::resolve;
use super::splice::Splicer;
use crate::config::EngineConfig;
use crate::dom::{Document, NodeId};
use crate::error::HighlightError;
use crate::keywords::KeywordStore;
use crate::visibility::{visible_root, VisibilityProbe};

/// What a pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Markers removed by the cleaning step
    pub removed: usize,
    /// Match spans found
    pub spans: usize,
    /// Markers inserted
    pub markers: usize,
}

/// Run one highlight pass over `root` with the given keywords.
///
/// An empty keyword list still cleans old markers.
pub fn highlight(
    doc: &mut Document,
    root: NodeId,
    keywords: &[String],
    config: &EngineConfig,
) -> PassReport {
    doc.untracked(|doc| {
        let mut report = PassReport {
            removed: clean(doc, root, config),
            ..PassReport::default()
        };

        let set = compiled(keywords);
        if set.is_empty() {
            return report;
        }

        let flat = flatten(doc, root, config);
        let spans = resolve(set.find_matches(&flat.text));
        report.spans = spans.len();

        let mut splicer = Splicer::new(root, &flat.segments, flat.text.len(), config);
        for span in &spans {
            match splicer.apply(doc, span) {
                Ok(inserted) => report.markers += inserted,
                Err(err) => tracing::trace!(%err, text = %span.matched_text, "span skipped"),
            }
        }

        report
    })
}

/// Remove all markers under `root` without journaling
pub fn clear(doc: &mut Document, root: NodeId, config: &EngineConfig) -> usize {
    doc.untracked(|doc| clean(doc, root, config))
}

/// Highlighting bound to a keyword store and a visibility probe
pub struct Highlighter<S, P> {
    config: EngineConfig,
    store: S,
    probe: P,
}

impl<S: KeywordStore, P: VisibilityProbe> Highlighter<S, P> {
    pub fn new(config: EngineConfig, store: S, probe: P) -> Self {
        Highlighter { config, store, probe }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Keywords for a pass; an unreadable store means no keywords
    pub fn keywords(&self) -> Vec<String> {
        match self.store.load() {
            Ok(keywords) => keywords,
            Err(err) => {
                let err = HighlightError::from(err);
                tracing::warn!(%err, "highlighting without keywords");
                Vec::new()
            }
        }
    }

    /// Run a pass on the visible message body.
    ///
    /// Returns `NoVisibleRoot` (after logging it) when no body is visible;
    /// the document is then left untouched.
    pub fn run(&self, doc: &mut Document) -> Result<PassReport, HighlightError> {
        let Some(root) = visible_root(doc, &self.config, &self.probe) else {
            tracing::debug!(body_class = %self.config.body_class, "no visible message body");
            return Err(HighlightError::NoVisibleRoot);
        };
        let keywords = self.keywords();
        let report = highlight(doc, root, &keywords, &self.config);
        tracing::debug!(
            root,
            removed = report.removed,
            spans = report.spans,
            markers = report.markers,
            "highlight pass"
        );
        Ok(report)
    }
}
