//! Marker removal

use super::is_marker;
use crate::config::EngineConfig;
use crate::dom::{Document, NodeId};

/// Unwrap every marker under `root` and merge the text it split apart.
///
/// Returns the number of markers removed. With no markers present the
/// document is not written at all.
pub fn clean(doc: &mut Document, root: NodeId, config: &EngineConfig) -> usize {
    let markers: Vec<NodeId> = doc
        .descendants(root)
        .filter(|&id| is_marker(doc, id, config))
        .collect();

    for &marker in &markers {
        let prev = doc.get(marker).and_then(|n| n.prev_sibling);
        let Some((first, last)) = doc.unwrap(marker) else {
            // Empty marker: its neighbours are now adjacent
            if let Some(prev) = prev {
                doc.merge_text_siblings(prev);
            }
            continue;
        };
        doc.merge_text_siblings(first);
        if last != first && doc.parent(last).is_some() {
            doc.merge_text_siblings(last);
        }
    }

    markers.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{inner_markup, DOCUMENT_NODE};

    fn clean_str(markup: &str) -> (String, usize) {
        let mut doc = Document::parse(markup);
        let removed = clean(&mut doc, DOCUMENT_NODE, &EngineConfig::default());
        (inner_markup(&doc, DOCUMENT_NODE), removed)
    }

    #[test]
    fn test_unwrap_and_merge() {
        let (markup, removed) =
            clean_str(r#"<p>This is <i><mark class="spamlight-hit">spam</mark>ish</i></p>"#);
        assert_eq!(removed, 1);
        assert_eq!(markup, "<p>This is <i>spamish</i></p>");
    }

    #[test]
    fn test_text_node_count_restored() {
        let mut doc = Document::parse(r#"<p>a <mark class="spamlight-hit">spam</mark> b</p>"#);
        let p = doc.descendants(DOCUMENT_NODE).next().unwrap();
        clean(&mut doc, DOCUMENT_NODE, &EngineConfig::default());
        let children: Vec<_> = doc.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(doc.text(children[0]), Some("a spam b"));
    }

    #[test]
    fn test_markers_across_elements() {
        let (markup, removed) = clean_str(concat!(
            r#"<p>buy <mark class="spamlight-hit">sp</mark>"#,
            r#"<b><mark class="spamlight-hit">am</mark></b>"#,
            r#"<mark class="spamlight-hit">mer</mark> now</p>"#,
        ));
        assert_eq!(removed, 3);
        assert_eq!(markup, "<p>buy sp<b>am</b>mer now</p>");
    }

    #[test]
    fn test_foreign_marks_untouched() {
        let input = r#"<p><mark>note</mark> <span class="spamlight-hit">x</span></p>"#;
        let (markup, removed) = clean_str(input);
        assert_eq!(removed, 0);
        assert_eq!(markup, input);
    }

    #[test]
    fn test_empty_marker_removed() {
        let mut doc = Document::parse(r#"<p>a<mark class="spamlight-hit"></mark>b</p>"#);
        let p = doc.descendants(DOCUMENT_NODE).next().unwrap();
        assert_eq!(clean(&mut doc, DOCUMENT_NODE, &EngineConfig::default()), 1);
        assert_eq!(doc.children(p).count(), 1);
        assert_eq!(inner_markup(&doc, DOCUMENT_NODE), "<p>ab</p>");
    }

    #[test]
    fn test_no_markers_no_writes() {
        let mut doc = Document::parse("<p>plain <b>text</b></p>");
        assert_eq!(clean(&mut doc, DOCUMENT_NODE, &EngineConfig::default()), 0);
        assert_eq!(doc.pending_mutations(), 0);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let mut doc = Document::parse(r#"<p>x <mark class="other spamlight-hit">y</mark> z</p>"#);
        let config = EngineConfig::default();
        assert_eq!(clean(&mut doc, DOCUMENT_NODE, &config), 1);
        let once = inner_markup(&doc, DOCUMENT_NODE);
        assert_eq!(clean(&mut doc, DOCUMENT_NODE, &config), 0);
        assert_eq!(inner_markup(&doc, DOCUMENT_NODE), once);
        assert_eq!(once, "<p>x y z</p>");
    }

    #[test]
    fn test_scoped_to_root() {
        let mut doc = Document::parse(concat!(
            r#"<div><mark class="spamlight-hit">out</mark></div>"#,
            r#"<div class="a3s"><mark class="spamlight-hit">in</mark></div>"#,
        ));
        let body = doc.first_with_class(DOCUMENT_NODE, "a3s").unwrap();
        assert_eq!(clean(&mut doc, body, &EngineConfig::default()), 1);
        assert_eq!(doc.elements_with_class(DOCUMENT_NODE, "spamlight-hit").len(), 1);
    }
}
