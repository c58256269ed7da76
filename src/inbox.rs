//! Inbox scanning
//!
//! Flags message list items whose subject or snippet contains a keyword.
//! Matching is a plain lower-cased substring test. Item texts are computed
//! and tested in parallel; class changes are applied afterwards in order.

use crate::config::EngineConfig;
use crate::dom::{Document, NodeId, DOCUMENT_NODE};
use rayon::prelude::*;

/// Outcome of a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned: usize,
    pub flagged: usize,
}

/// Lower-cased subject, then a space and the lower-cased snippet, each only
/// when the item has that part
fn item_text(doc: &Document, item: NodeId, config: &EngineConfig) -> String {
    let mut text = String::new();
    if let Some(subject) = doc.first_with_class(item, &config.subject_class) {
        text.push_str(&doc.text_content(subject).to_lowercase());
    }
    if let Some(snippet) = doc.first_with_class(item, &config.snippet_class) {
        text.push(' ');
        text.push_str(&doc.text_content(snippet).to_lowercase());
    }
    text
}

/// Clear old flags, then flag every item matching a keyword
pub fn scan_inbox(doc: &mut Document, keywords: &[String], config: &EngineConfig) -> ScanSummary {
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase)
        .collect();

    for id in doc.elements_with_class(DOCUMENT_NODE, &config.flag_class) {
        doc.remove_class(id, &config.flag_class);
    }

    let items = doc.elements_with_class(DOCUMENT_NODE, &config.item_class);
    let flags: Vec<bool> = {
        let doc: &Document = doc;
        items
            .par_iter()
            .map(|&item| {
                let text = item_text(doc, item, config);
                needles.iter().any(|needle| text.contains(needle.as_str()))
            })
            .collect()
    };

    let mut summary = ScanSummary {
        scanned: items.len(),
        flagged: 0,
    };
    for (&item, flagged) in items.iter().zip(flags) {
        if flagged {
            doc.add_class(item, &config.flag_class);
            summary.flagged += 1;
        }
    }

    tracing::debug!(scanned = summary.scanned, flagged = summary.flagged, "inbox scanned");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    const INBOX: &str = concat!(
        r#"<table><tr class="zA"><td><span class="bog">You are a WINNER</span><span class="y2">claim now</span></td></tr>"#,
        r#"<tr class="zA yO"><td><span class="bog">Team lunch</span><span class="y2">Friday at noon</span></td></tr>"#,
        r#"<tr class="zA"><td><span class="y2">Limited time OFFER inside</span></td></tr>"#,
        r#"<tr class="zA"><td>no subject or snippet: winner</td></tr></table>"#,
    );

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn flagged(doc: &Document) -> Vec<NodeId> {
        doc.elements_with_class(DOCUMENT_NODE, "highlighted-spam")
    }

    #[test]
    fn test_scan_flags_matching_items() {
        let mut doc = Document::parse(INBOX);
        let summary = scan_inbox(&mut doc, &words(&["winner", "offer"]), &EngineConfig::default());
        assert_eq!(summary, ScanSummary { scanned: 4, flagged: 2 });

        let items = doc.elements_with_class(DOCUMENT_NODE, "zA");
        assert_eq!(flagged(&doc), vec![items[0], items[2]]);
    }

    #[test]
    fn test_rescan_clears_previous_flags() {
        let mut doc = Document::parse(INBOX);
        let config = EngineConfig::default();
        scan_inbox(&mut doc, &words(&["lunch"]), &config);
        assert_eq!(flagged(&doc).len(), 1);

        let summary = scan_inbox(&mut doc, &words(&["nothing matches"]), &config);
        assert_eq!(summary.flagged, 0);
        assert!(flagged(&doc).is_empty());
        // The other classes stay
        let items = doc.elements_with_class(DOCUMENT_NODE, "zA");
        assert_eq!(doc.attribute(items[1], "class"), Some("zA yO"));
    }

    #[test]
    fn test_subject_and_snippet_joined_with_space() {
        let mut doc = Document::parse(INBOX);
        let summary = scan_inbox(&mut doc, &words(&["winner claim"]), &EngineConfig::default());
        assert_eq!(summary.flagged, 1);
    }

    #[test]
    fn test_blank_keywords_match_nothing() {
        let mut doc = Document::parse(INBOX);
        let summary = scan_inbox(&mut doc, &words(&["", "  "]), &EngineConfig::default());
        assert_eq!(summary, ScanSummary { scanned: 4, flagged: 0 });
    }

    #[test]
    fn test_empty_inbox() {
        let mut doc = Document::parse("<div>nothing here</div>");
        let summary = scan_inbox(&mut doc, &words(&["x"]), &EngineConfig::default());
        assert_eq!(summary, ScanSummary::default());
    }
}
