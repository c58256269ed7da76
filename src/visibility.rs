//! Visible message body selection
//!
//! A mail client keeps several message bodies in the document (collapsed
//! thread entries, cached views) and shows one. The highlighter only works
//! on the visible one; which one that is comes from a probe.

use crate::config::EngineConfig;
use crate::dom::{Document, NodeId, DOCUMENT_NODE};

/// Decides whether a node is currently rendered
pub trait VisibilityProbe {
    fn is_visible(&self, doc: &Document, node: NodeId) -> bool;
}

impl<F> VisibilityProbe for F
where
    F: Fn(&Document, NodeId) -> bool,
{
    fn is_visible(&self, doc: &Document, node: NodeId) -> bool {
        self(doc, node)
    }
}

/// Visibility from markup alone: a node is hidden when it or an ancestor
/// carries `hidden`, `display: none` or `visibility: hidden` inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineStyleProbe;

impl VisibilityProbe for InlineStyleProbe {
    fn is_visible(&self, doc: &Document, node: NodeId) -> bool {
        doc.is_attached(node)
            && !std::iter::once(node)
                .chain(doc.ancestors(node))
                .any(|id| hides(doc, id))
    }
}

fn hides(doc: &Document, id: NodeId) -> bool {
    doc.attribute(id, "hidden").is_some() || doc.attribute(id, "style").is_some_and(style_hides)
}

fn style_hides(style: &str) -> bool {
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .any(|(property, value)| {
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim().to_ascii_lowercase();
            let value = value.trim_end_matches("!important").trim_end();
            (property == "display" && value == "none")
                || (property == "visibility" && value == "hidden")
        })
}

/// First watched body element, in document order, that the probe reports visible
pub fn visible_root<P>(doc: &Document, config: &EngineConfig, probe: &P) -> Option<NodeId>
where
    P: VisibilityProbe + ?Sized,
{
    doc.descendants(DOCUMENT_NODE)
        .filter(|&id| doc.has_class(id, &config.body_class))
        .find(|&id| probe.is_visible(doc, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bodies(doc: &Document) -> Vec<NodeId> {
        doc.elements_with_class(DOCUMENT_NODE, "a3s")
    }

    #[test]
    fn test_first_visible_body_chosen() {
        let doc = Document::parse(concat!(
            r#"<div style="display: none"><div class="a3s">old</div></div>"#,
            r#"<div class="a3s" hidden>cached</div>"#,
            r#"<div class="a3s">open</div>"#,
            r#"<div class="a3s">later</div>"#,
        ));
        let root = visible_root(&doc, &EngineConfig::default(), &InlineStyleProbe).unwrap();
        assert_eq!(doc.text_content(root), "open");
    }

    #[test]
    fn test_no_visible_body() {
        let doc = Document::parse(r#"<div class="a3s" style="VISIBILITY:hidden !important">x</div>"#);
        assert_eq!(visible_root(&doc, &EngineConfig::default(), &InlineStyleProbe), None);
    }

    #[test]
    fn test_detached_node_invisible() {
        let mut doc = Document::parse(r#"<div class="a3s">x</div>"#);
        let body = bodies(&doc)[0];
        assert!(InlineStyleProbe.is_visible(&doc, body));
        doc.detach(body);
        assert!(!InlineStyleProbe.is_visible(&doc, body));
    }

    #[test]
    fn test_closure_probe() {
        let doc = Document::parse(r#"<div class="a3s">one</div><div class="a3s" id="two">two</div>"#);
        let probe = |doc: &Document, id: NodeId| doc.attribute(id, "id") == Some("two");
        let root = visible_root(&doc, &EngineConfig::default(), &probe).unwrap();
        assert_eq!(doc.text_content(root), "two");
    }

    #[test]
    fn test_style_parsing() {
        assert!(style_hides("color: red; display:none"));
        assert!(!style_hides("display: block"));
        assert!(!style_hides("nodisplay"));
    }
}
