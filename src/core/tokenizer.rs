//! Lenient Markup Tokenizer
//!
//! Pull tokenizer for the HTML-ish markup found in message bodies. It never
//! fails: anything that does not look like markup is returned as text.
//!
//! - `<name ...>` / `<name .../>` start tags, `</name>` end tags
//! - `<!-- ... -->` comments, `<!...>` declarations, `<?...>` bogus comments
//! - raw text inside `script` and `style` up to the matching close tag

use super::attributes::{lowercase_name, parse_attributes, Attribute};
use super::entities::decode_text;
use super::scanner::Scanner;
use std::borrow::Cow;

/// Elements whose content is raw text rather than markup
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// A markup token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// `<name attrs>` or `<name attrs/>`
    StartTag {
        name: Cow<'a, str>,
        attributes: Vec<Attribute<'a>>,
        self_closing: bool,
    },
    /// `</name>`
    EndTag { name: Cow<'a, str> },
    /// Character data, references decoded (raw for script/style)
    Text(Cow<'a, str>),
    /// Comment content without the delimiters
    Comment(&'a str),
    /// `<!DOCTYPE ...>` and other declarations, content without `<!` and `>`
    Declaration(&'a str),
}

/// Lenient markup tokenizer
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    /// Set after a raw-text start tag; the next token is its content
    raw_text: Option<Cow<'a, str>>,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            raw_text: None,
        }
    }

    /// Get the next token, or None at end of input
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if let Some(element) = self.raw_text.take() {
            if let Some(token) = self.read_raw_text(&element) {
                return Some(token);
            }
        }

        if self.scanner.is_eof() {
            return None;
        }

        if self.scanner.starts_with(b"<") {
            if let Some(token) = self.read_markup() {
                return Some(token);
            }
            // A '<' that opens nothing is literal text
            return Some(self.read_text(1));
        }

        Some(self.read_text(0))
    }

    /// Read text from the current position up to the next '<' after `skip` bytes
    fn read_text(&mut self, skip: usize) -> Token<'a> {
        let start = self.scanner.position();
        self.scanner.advance(skip);
        let end = self
            .scanner
            .find_tag_start()
            .unwrap_or(self.scanner.input_len());
        self.scanner.set_position(end);
        Token::Text(decode_text(self.scanner.slice(start, end)))
    }

    fn read_raw_text(&mut self, element: &str) -> Option<Token<'a>> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find_raw_text_end(element)
            .unwrap_or(self.scanner.input_len());
        self.scanner.set_position(end);
        if end > start {
            Some(Token::Text(Cow::Borrowed(self.scanner.slice(start, end))))
        } else {
            None
        }
    }

    /// Try to read markup at a '<'. Restores the position and returns None
    /// when the '<' does not start a tag.
    fn read_markup(&mut self) -> Option<Token<'a>> {
        let start = self.scanner.position();

        if self.scanner.starts_with(b"<!--") {
            self.scanner.advance(4);
            let content_start = self.scanner.position();
            let (content_end, resume) = match self.scanner.find_seq(b"-->") {
                Some(end) => (end, end + 3),
                None => (self.scanner.input_len(), self.scanner.input_len()),
            };
            self.scanner.set_position(resume);
            return Some(Token::Comment(self.scanner.slice(content_start, content_end)));
        }

        match self.scanner.peek_at(1) {
            Some(b'!') | Some(b'?') => {
                let is_declaration = self.scanner.peek_at(1) == Some(b'!');
                self.scanner.advance(2);
                let content_start = self.scanner.position();
                let (content_end, resume) = match self.scanner.find_byte(b'>') {
                    Some(end) => (end, end + 1),
                    None => (self.scanner.input_len(), self.scanner.input_len()),
                };
                self.scanner.set_position(resume);
                let content = self.scanner.slice(content_start, content_end);
                Some(if is_declaration {
                    Token::Declaration(content)
                } else {
                    Token::Comment(content)
                })
            }
            Some(b'/') => {
                self.scanner.advance(2);
                let Some(name) = self.scanner.read_name() else {
                    self.scanner.set_position(start);
                    return None;
                };
                let resume = self
                    .scanner
                    .find_byte(b'>')
                    .map(|end| end + 1)
                    .unwrap_or(self.scanner.input_len());
                self.scanner.set_position(resume);
                Some(Token::EndTag {
                    name: lowercase_name(name),
                })
            }
            _ => {
                self.scanner.advance(1);
                let Some(name) = self.scanner.read_name() else {
                    self.scanner.set_position(start);
                    return None;
                };
                let attrs_start = self.scanner.position();
                let (attrs_end, resume) = match self.scanner.find_tag_end_quoted() {
                    Some(end) => (end, end + 1),
                    None => (self.scanner.input_len(), self.scanner.input_len()),
                };
                self.scanner.set_position(resume);
                let raw_attrs = self.scanner.slice(attrs_start, attrs_end);
                let self_closing = raw_attrs.trim_end().ends_with('/');
                let name = lowercase_name(name);

                if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_ref()) {
                    self.raw_text = Some(name.clone());
                }

                Some(Token::StartTag {
                    name,
                    attributes: parse_attributes(raw_attrs),
                    self_closing,
                })
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input).collect()
    }

    fn text(s: &str) -> Token<'_> {
        Token::Text(Cow::Borrowed(s))
    }

    #[test]
    fn test_simple_element() {
        let toks = tokens("<b>bold</b>");
        assert_eq!(toks.len(), 3);
        assert!(matches!(&toks[0], Token::StartTag { name, self_closing: false, .. } if name == "b"));
        assert_eq!(toks[1], text("bold"));
        assert!(matches!(&toks[2], Token::EndTag { name } if name == "b"));
    }

    #[test]
    fn test_uppercase_names_lowercased() {
        let toks = tokens("<DIV CLASS=x></Div>");
        assert!(matches!(&toks[0], Token::StartTag { name, attributes, .. }
            if name == "div" && attributes[0].name == "class"));
        assert!(matches!(&toks[1], Token::EndTag { name } if name == "div"));
    }

    #[test]
    fn test_self_closing_and_void() {
        let toks = tokens("a<br/>b<br>c");
        assert_eq!(toks.len(), 5);
        assert!(matches!(&toks[1], Token::StartTag { self_closing: true, .. }));
        assert!(matches!(&toks[3], Token::StartTag { self_closing: false, .. }));
    }

    #[test]
    fn test_literal_less_than() {
        let toks = tokens("3 < 4 and 5 <6");
        let joined: String = toks
            .iter()
            .map(|t| match t {
                Token::Text(s) => s.to_string(),
                other => panic!("unexpected token {:?}", other),
            })
            .collect();
        assert_eq!(joined, "3 < 4 and 5 <6");
    }

    #[test]
    fn test_comment_and_doctype() {
        let toks = tokens("<!DOCTYPE html><!-- hi --><p>x</p>");
        assert_eq!(toks[0], Token::Declaration("DOCTYPE html"));
        assert_eq!(toks[1], Token::Comment(" hi "));
    }

    #[test]
    fn test_unterminated_comment() {
        let toks = tokens("a<!-- never");
        assert_eq!(toks, vec![text("a"), Token::Comment(" never")]);
    }

    #[test]
    fn test_script_is_raw_text() {
        let toks = tokens("<script>if (a < b && c) { x = '<b>'; }</script>after");
        assert_eq!(toks[1], text("if (a < b && c) { x = '<b>'; }"));
        assert!(matches!(&toks[2], Token::EndTag { name } if name == "script"));
        assert_eq!(toks[3], text("after"));
    }

    #[test]
    fn test_empty_style() {
        let toks = tokens("<style></style>x");
        assert_eq!(toks.len(), 3);
        assert!(matches!(&toks[1], Token::EndTag { name } if name == "style"));
    }

    #[test]
    fn test_text_entities_decoded() {
        let toks = tokens("<p>Fish &amp; Chips</p>");
        assert_eq!(toks[1], Token::Text(Cow::Owned("Fish & Chips".to_string())));
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        let toks = tokens(r#"<a title="a>b" href=x>link</a>"#);
        assert!(matches!(&toks[0], Token::StartTag { attributes, .. }
            if attributes[0].value == "a>b" && attributes[1].value == "x"));
        assert_eq!(toks[1], text("link"));
    }
}
