//! Entity handling for the markup scanner and serializer.
//!
//! Contract:
//! - Text runs decode exactly `&lt;`, `&gt;` and `&amp;`.
//! - Attribute values additionally decode `&quot;`.
//! - Anything else, including numeric references and unknown names, passes through unchanged.
//! - Decoding is single pass: `&amp;lt;` decodes to `&lt;`, never to `<`.
//!
//! The serializer escapes the same sets so that parse(serialize(tree)) reproduces `tree`.

use memchr::memchr;
use std::borrow::Cow;

const TEXT_ENTITIES: &[(&[u8], char)] = &[(b"&lt;", '<'), (b"&gt;", '>'), (b"&amp;", '&')];
const ATTRIBUTE_ENTITIES: &[(&[u8], char)] = &[
    (b"&lt;", '<'),
    (b"&gt;", '>'),
    (b"&amp;", '&'),
    (b"&quot;", '"'),
];

pub(crate) fn decode_text(s: &str) -> Cow<'_, str> {
    decode_with(s, TEXT_ENTITIES)
}

pub(crate) fn decode_attribute(s: &str) -> Cow<'_, str> {
    decode_with(s, ATTRIBUTE_ENTITIES)
}

fn decode_with<'a>(s: &'a str, table: &[(&[u8], char)]) -> Cow<'a, str> {
    let bytes = s.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(s);
    };
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut i = first;
    while i < bytes.len() {
        let Some(rel) = memchr(b'&', &bytes[i..]) else {
            out.push_str(&s[i..]);
            break;
        };
        let amp = i + rel;
        out.push_str(&s[i..amp]);
        match table
            .iter()
            .find(|(pat, _)| bytes.get(amp..amp + pat.len()) == Some(*pat))
        {
            Some((pat, ch)) => {
                out.push(*ch);
                i = amp + pat.len();
            }
            None => {
                out.push('&');
                i = amp + 1;
            }
        }
    }
    Cow::Owned(out)
}

pub(crate) fn escape_text(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

pub(crate) fn escape_attribute(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_core_entities_in_text() {
        assert_eq!(decode_text("a &lt;b&gt; &amp; c"), "a <b> & c");
    }

    #[test]
    fn text_leaves_other_entities_alone() {
        assert_eq!(decode_text("&quot;&nbsp;&#65;"), "&quot;&nbsp;&#65;");
    }

    #[test]
    fn attribute_values_decode_quotes() {
        assert_eq!(decode_attribute("say &quot;hi&quot;"), "say \"hi\"");
    }

    #[test]
    fn decoding_is_single_pass() {
        assert_eq!(decode_text("&amp;lt;"), "&lt;");
    }

    #[test]
    fn partial_entities_stay_literal() {
        assert_eq!(decode_text("fish &amp chips &"), "fish &amp chips &");
    }

    #[test]
    fn borrowed_when_nothing_to_decode() {
        assert!(matches!(decode_text("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn escape_then_decode_is_identity() {
        let raw = "a < b && c > \"d\"";
        let mut text = String::new();
        escape_text(raw, &mut text);
        assert_eq!(decode_text(&text), raw);
        let mut attr = String::new();
        escape_attribute(raw, &mut attr);
        assert_eq!(decode_attribute(&attr), raw);
    }

    #[test]
    fn preserves_utf8_around_entities() {
        assert_eq!(decode_text("café &amp; crème"), "café & crème");
    }
}
