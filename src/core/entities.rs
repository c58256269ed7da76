//! Character Reference Decoding and Escaping
//!
//! Handles the references that show up in mail bodies:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Common HTML named entities (&nbsp; and typographic quotes/dashes)
//! - Numeric character references: &#123; &#x7B;
//!
//! Uses Cow for zero-copy when no references are present. Unknown or
//! malformed references are kept verbatim; decoding never fails.

use memchr::memchr;
use std::borrow::Cow;

/// Decode text content, handling character references
///
/// Returns Borrowed if no references present (zero-copy),
/// returns Owned if references were decoded.
#[inline]
pub fn decode_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if there are any references using SIMD
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Decode all references in the input
pub fn decode_entities(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(amp_offset) = memchr(b'&', &bytes[pos..]) else {
            result.push_str(&input[pos..]);
            break;
        };
        result.push_str(&input[pos..pos + amp_offset]);
        pos += amp_offset;

        // References are short; a far-away ';' belongs to something else
        let window = &bytes[pos + 1..bytes.len().min(pos + 34)];
        match memchr(b';', window).and_then(|semi| {
            let entity = &input[pos + 1..pos + 1 + semi];
            decode_entity(entity).map(|c| (c, semi))
        }) {
            Some((decoded, semi)) => {
                result.push(decoded);
                pos += semi + 2;
            }
            None => {
                result.push('&');
                pos += 1;
            }
        }
    }

    result
}

/// Decode a single reference (without & and ;)
fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }

    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "copy" => Some('\u{00A9}'),
        "reg" => Some('\u{00AE}'),
        "trade" => Some('\u{2122}'),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201C}'),
        "rdquo" => Some('\u{201D}'),
        "hellip" => Some('\u{2026}'),
        _ => None,
    }
}

/// Decode a numeric character reference
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };
    // NUL is never rendered
    if codepoint == 0 {
        return None;
    }
    char::from_u32(codepoint)
}

/// Escape text content for markup output (`&`, `<`, `>`)
pub fn encode_text(input: &str) -> Cow<'_, str> {
    encode_with(input, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

/// Escape a double-quoted attribute value (`&`, `"`)
pub fn encode_attribute(input: &str) -> Cow<'_, str> {
    encode_with(input, |c| match c {
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        _ => None,
    })
}

fn encode_with(input: &str, escape: impl Fn(char) -> Option<&'static str>) -> Cow<'_, str> {
    // Fast path: check if any escaping needed
    if !input.chars().any(|c| escape(c).is_some()) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match escape(c) {
            Some(replacement) => result.push_str(replacement),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities_borrows() {
        assert!(matches!(decode_text("plain text"), Cow::Borrowed("plain text")));
    }

    #[test]
    fn test_builtin_entities() {
        assert_eq!(decode_text("a &lt;b&gt; &amp; &quot;c&quot;"), "a <b> & \"c\"");
    }

    #[test]
    fn test_nbsp_and_numeric() {
        assert_eq!(decode_text("x&nbsp;y&#65;&#x42;"), "x\u{00A0}yAB");
    }

    #[test]
    fn test_unknown_entity_kept() {
        assert_eq!(decode_text("Tom &bogus; Jerry"), "Tom &bogus; Jerry");
    }

    #[test]
    fn test_bare_ampersand_kept() {
        assert_eq!(decode_text("R&D dept; fine"), "R&D dept; fine");
    }

    #[test]
    fn test_multibyte_text_around_entities() {
        assert_eq!(decode_text("Grüße &amp; café"), "Grüße & café");
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert!(matches!(encode_text("clean"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_encode_attribute() {
        assert_eq!(encode_attribute("say \"hi\" & <bye>"), "say &quot;hi&quot; &amp; <bye>");
    }
}
