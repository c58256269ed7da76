//! Markup Attribute Parsing
//!
//! Parses attributes from the inside of a start tag. Lenient like a browser:
//! quoted, unquoted and bare (boolean) attributes are all accepted, and
//! garbage bytes are skipped rather than rejected.

use super::entities::decode_text;
use std::borrow::Cow;

/// A parsed attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name, lower-cased
    pub name: Cow<'a, str>,
    /// Attribute value (references decoded); empty for boolean attributes
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    /// Create a new attribute
    pub fn new(name: &'a str, value: Cow<'a, str>) -> Self {
        Attribute {
            name: lowercase_name(name),
            value,
        }
    }
}

/// Lower-case an ASCII name, borrowing when it already is
pub fn lowercase_name(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/// Parse attributes from raw tag content (after the element name)
///
/// Input should be the content between element name and '>' (a trailing
/// '/' of a self-closing tag is tolerated).
pub fn parse_attributes(input: &str) -> Vec<Attribute<'_>> {
    let bytes = input.as_bytes();
    let mut attrs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        while pos < bytes.len() && (is_whitespace(bytes[pos]) || bytes[pos] == b'/') {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let name_start = pos;
        while pos < bytes.len() && is_attr_name_byte(bytes[pos]) {
            pos += 1;
        }
        if pos == name_start {
            // Stray quote or '=' with no name
            pos += 1;
            continue;
        }
        let name = &input[name_start..pos];

        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() || bytes[pos] != b'=' {
            attrs.push(Attribute::new(name, Cow::Borrowed("")));
            continue;
        }
        pos += 1;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        let raw = match bytes.get(pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let value_start = pos + 1;
                let value_end = memchr::memchr(quote, &bytes[value_start..])
                    .map(|i| value_start + i)
                    .unwrap_or(bytes.len());
                pos = (value_end + 1).min(bytes.len());
                &input[value_start..value_end]
            }
            _ => {
                let value_start = pos;
                while pos < bytes.len() && !is_whitespace(bytes[pos]) {
                    pos += 1;
                }
                &input[value_start..pos]
            }
        };

        attrs.push(Attribute::new(name, decode_text(raw)));
    }

    attrs
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

#[inline]
fn is_attr_name_byte(b: u8) -> bool {
    !is_whitespace(b) && !matches!(b, b'=' | b'/' | b'>' | b'"' | b'\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_values() {
        let attrs = parse_attributes(r#" class="a3s aiL" id='body'"#);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name, "class");
        assert_eq!(attrs[0].value, "a3s aiL");
        assert_eq!(attrs[1].name, "id");
        assert_eq!(attrs[1].value, "body");
    }

    #[test]
    fn test_unquoted_and_boolean() {
        let attrs = parse_attributes(" width=600 hidden data-x = y");
        let pairs: Vec<_> = attrs
            .iter()
            .map(|a| (a.name.as_ref(), a.value.as_ref()))
            .collect();
        assert_eq!(pairs, vec![("width", "600"), ("hidden", ""), ("data-x", "y")]);
    }

    #[test]
    fn test_names_lowercased_values_decoded() {
        let attrs = parse_attributes(r#" HREF="a?b=1&amp;c=2""#);
        assert_eq!(attrs[0].name, "href");
        assert_eq!(attrs[0].value, "a?b=1&c=2");
    }

    #[test]
    fn test_self_closing_slash_ignored() {
        let attrs = parse_attributes(r#" src="x.png" /"#);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, "src");
    }

    #[test]
    fn test_unterminated_quote() {
        let attrs = parse_attributes(r#" title="never closed"#);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value, "never closed");
    }
}
