//! Markup serialization
//!
//! Writes a document (or a subtree) back to markup. Parsing the output
//! yields the same tree, so flattened text survives a round trip.

use super::document::{Document, VOID_ELEMENTS};
use super::node::{NodeId, NodeKind};
use crate::core::entities::{encode_attribute, encode_text};
use crate::core::tokenizer::RAW_TEXT_ELEMENTS;

/// Serialize the children of `node_id` (the whole document for the document node)
pub fn inner_markup(doc: &Document, node_id: NodeId) -> String {
    let mut buf = String::new();
    for child in doc.children(node_id) {
        write_node(doc, child, &mut buf);
    }
    buf
}

/// Serialize a node including its own tags
pub fn outer_markup(doc: &Document, node_id: NodeId) -> String {
    let mut buf = String::new();
    write_node(doc, node_id, &mut buf);
    buf
}

/// Iterative serializer to avoid stack overflow on deeply nested documents
fn write_node(doc: &Document, node_id: NodeId, buf: &mut String) {
    enum StackEntry {
        Enter(NodeId),
        Close(NodeId),
    }

    let mut stack: Vec<StackEntry> = Vec::with_capacity(64);
    stack.push(StackEntry::Enter(node_id));

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Close(id) => {
                if let Some(name) = doc.node_name(id) {
                    buf.push_str("</");
                    buf.push_str(name);
                    buf.push('>');
                }
            }
            StackEntry::Enter(current_id) => {
                let Some(node) = doc.get(current_id) else {
                    continue;
                };

                match node.kind {
                    NodeKind::Element => {
                        let name = doc.node_name(current_id).unwrap_or("");
                        buf.push('<');
                        buf.push_str(name);
                        for attr in &node.attributes {
                            buf.push(' ');
                            buf.push_str(doc.strings.get(attr.name_id).unwrap_or(""));
                            buf.push_str("=\"");
                            buf.push_str(&encode_attribute(&attr.value));
                            buf.push('"');
                        }
                        buf.push('>');

                        if VOID_ELEMENTS.contains(&name) {
                            continue;
                        }

                        if RAW_TEXT_ELEMENTS.contains(&name) {
                            for child in doc.children(current_id) {
                                buf.push_str(doc.text(child).unwrap_or(""));
                            }
                            buf.push_str("</");
                            buf.push_str(name);
                            buf.push('>');
                            continue;
                        }

                        // Push closing tag first (processed after children)
                        stack.push(StackEntry::Close(current_id));
                        let mut child_id = node.last_child;
                        while let Some(cid) = child_id {
                            stack.push(StackEntry::Enter(cid));
                            child_id = doc.get(cid).and_then(|n| n.prev_sibling);
                        }
                    }
                    NodeKind::Text => buf.push_str(&encode_text(&node.data)),
                    NodeKind::Comment => {
                        buf.push_str("<!--");
                        buf.push_str(&node.data);
                        buf.push_str("-->");
                    }
                    NodeKind::Declaration => {
                        buf.push_str("<!");
                        buf.push_str(&node.data);
                        buf.push('>');
                    }
                    NodeKind::Document => {
                        let mut child_id = node.last_child;
                        while let Some(cid) = child_id {
                            stack.push(StackEntry::Enter(cid));
                            child_id = doc.get(cid).and_then(|n| n.prev_sibling);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DOCUMENT_NODE;

    fn round_trip(input: &str) -> String {
        inner_markup(&Document::parse(input), DOCUMENT_NODE)
    }

    #[test]
    fn test_elements_and_attributes() {
        assert_eq!(
            round_trip(r#"<div class="a3s" id=m1><b>hi</b></div>"#),
            r#"<div class="a3s" id="m1"><b>hi</b></div>"#
        );
    }

    #[test]
    fn test_void_and_empty_elements() {
        assert_eq!(round_trip("a<br/>b<span></span>"), "a<br>b<span></span>");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            round_trip(r#"<p title="say &quot;hi&quot;">1 &lt; 2 &amp; 3</p>"#),
            r#"<p title="say &quot;hi&quot;">1 &lt; 2 &amp; 3</p>"#
        );
    }

    #[test]
    fn test_raw_text_not_escaped() {
        let markup = "<script>if (a < b) {}</script>";
        assert_eq!(round_trip(markup), markup);
    }

    #[test]
    fn test_comments_and_declarations() {
        let markup = "<!DOCTYPE html><!-- note --><p>x</p>";
        assert_eq!(round_trip(markup), markup);
    }

    #[test]
    fn test_outer_markup() {
        let doc = Document::parse("<ul><li>one</li><li>two</li></ul>");
        let li = doc
            .descendants(DOCUMENT_NODE)
            .find(|&id| doc.node_name(id) == Some("li"))
            .unwrap();
        assert_eq!(outer_markup(&doc, li), "<li>one</li>");
    }

    #[test]
    fn test_reparse_is_stable() {
        let once = round_trip("<div>Fish &amp; <i>chips</div> <p>x");
        assert_eq!(round_trip(&once), once);
    }
}
