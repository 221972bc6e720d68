//! Lenient markup scanner.
//!
//! A byte-level state machine; there is no regex and no backtracking, so every construct is
//! scanned in time linear in its length.
//!
//! Accepted constructs:
//! - start tags with `name`, `name=value`, `name="value"` and `name='value'` attributes,
//!   optionally self-closing (`/>`);
//! - end tags (anything between the name and `>` is ignored);
//! - comments `<!--...-->` (an unterminated comment runs to end of input);
//! - `<!DOCTYPE ...>`; other `<!...>` and `<?...>` constructs are dropped;
//! - raw text inside `<script>`/`<style>`, closed by a case-insensitive end tag.
//!
//! A `<` that does not begin one of these constructs is plain text. Tag names use the ASCII
//! class `[A-Za-z0-9:_-]`; attribute names stop at whitespace, `/`, `>`, `=` or quotes.
//! Names keep their source case; normalization happens in the tree builder.

use crate::entities::{decode_attribute, decode_text};
use memchr::memchr;

const HTML_COMMENT_START: &str = "<!--";
const HTML_COMMENT_END: &str = "-->";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

fn is_tag_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

fn is_attribute_name_char(c: u8) -> bool {
    !(c.is_ascii_whitespace() || matches!(c, b'/' | b'>' | b'=' | b'"' | b'\''))
}

/// Whether the `<` at `lt` opens markup rather than being literal text.
fn opens_markup(bytes: &[u8], lt: usize) -> bool {
    match bytes.get(lt + 1) {
        Some(b'!') | Some(b'?') => true,
        Some(b'/') => bytes.get(lt + 2).is_some_and(|c| c.is_ascii_alphabetic()),
        Some(c) => c.is_ascii_alphabetic(),
        None => false,
    }
}

// `<` cannot appear in UTF-8 continuation bytes, so scanning for it bytewise is safe.
fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let hay_bytes = haystack.as_bytes();
    let len = hay_bytes.len();
    let n = close_tag.len();
    debug_assert!(n >= 2 && close_tag[0] == b'<' && close_tag[1] == b'/');
    let mut i = 0;
    while i + n <= len {
        let rel = memchr(b'<', &hay_bytes[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if starts_with_ignore_ascii_case_at(hay_bytes, i, close_tag) {
            let mut k = i + n;
            while k < len && hay_bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && hay_bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

fn push_text(out: &mut Vec<Token>, raw: &str) {
    if raw.is_empty() {
        return;
    }
    out.push(Token::Text(decode_text(raw).into_owned()));
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut text_start = 0;
    let mut i = 0;
    // Slice endpoints are always ASCII structural bytes or the ends of ASCII-only runs, so
    // every slice below lands on a UTF-8 char boundary.
    while i < len {
        let Some(rel) = memchr(b'<', &bytes[i..]) else {
            break;
        };
        let lt = i + rel;
        if !opens_markup(bytes, lt) {
            i = lt + 1;
            continue;
        }
        push_text(&mut out, &input[text_start..lt]);

        if input[lt..].starts_with(HTML_COMMENT_START) {
            let body_start = lt + HTML_COMMENT_START.len();
            match input[body_start..].find(HTML_COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                    i = body_start + end + HTML_COMMENT_END.len();
                }
                None => {
                    out.push(Token::Comment(input[body_start..].to_string()));
                    i = len;
                }
            }
            text_start = i;
            continue;
        }

        if bytes[lt + 1] == b'!' || bytes[lt + 1] == b'?' {
            let end = memchr(b'>', &bytes[lt..]).map_or(len, |rel| lt + rel + 1);
            if starts_with_ignore_ascii_case_at(bytes, lt, b"<!doctype") {
                let body_end = if end > lt && bytes[end - 1] == b'>' {
                    end - 1
                } else {
                    end
                };
                out.push(Token::Doctype(input[lt + 2..body_end].trim().to_string()));
            } else {
                log::trace!(target: "vdom.markup", "dropping bogus markup at byte {lt}");
            }
            i = end;
            text_start = i;
            continue;
        }

        if bytes[lt + 1] == b'/' {
            let start = lt + 2;
            let mut j = start;
            while j < len && is_tag_name_char(bytes[j]) {
                j += 1;
            }
            let name = input[start..j].to_string();
            j = memchr(b'>', &bytes[j..]).map_or(len, |rel| j + rel + 1);
            out.push(Token::EndTag(name));
            i = j;
            text_start = i;
            continue;
        }

        let (token, content_start) = scan_start_tag(input, lt);
        let Token::StartTag {
            name, self_closing, ..
        } = &token
        else {
            unreachable!("scan_start_tag always yields a start tag");
        };
        let rawtext_close: Option<&[u8]> = if *self_closing {
            None
        } else if name.eq_ignore_ascii_case("script") {
            Some(b"</script")
        } else if name.eq_ignore_ascii_case("style") {
            Some(b"</style")
        } else {
            None
        };
        let end_name = name.clone();
        out.push(token);

        match rawtext_close {
            Some(close_tag) => {
                let body = &input[content_start..];
                match find_rawtext_close_tag(body, close_tag) {
                    Some((rel_start, rel_end)) => {
                        let raw = &body[..rel_start];
                        if !raw.is_empty() {
                            out.push(Token::Text(raw.to_string()));
                        }
                        out.push(Token::EndTag(end_name));
                        i = content_start + rel_end;
                    }
                    None => {
                        // Missing close tag: the remainder is raw text and the element closes
                        // implicitly.
                        if !body.is_empty() {
                            out.push(Token::Text(body.to_string()));
                        }
                        out.push(Token::EndTag(end_name));
                        i = len;
                    }
                }
            }
            None => i = content_start,
        }
        text_start = i;
    }
    if text_start < len {
        push_text(&mut out, &input[text_start..]);
    }
    out
}

/// Scans a start tag beginning at `lt`; returns the token and the byte offset after it.
fn scan_start_tag(input: &str, lt: usize) -> (Token, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let start = lt + 1;
    let mut k = start;
    while k < len && is_tag_name_char(bytes[k]) {
        k += 1;
    }
    let name = input[start..k].to_string();
    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    let skip_whitespace = |k: &mut usize| {
        while *k < len && bytes[*k].is_ascii_whitespace() {
            *k += 1;
        }
    };

    loop {
        skip_whitespace(&mut k);
        if k >= len {
            break;
        }
        if bytes[k] == b'>' {
            k += 1;
            break;
        }
        if bytes[k] == b'/' {
            if k + 1 < len && bytes[k + 1] == b'>' {
                self_closing = true;
                k += 2;
                break;
            }
            k += 1;
            continue;
        }
        let name_start = k;
        while k < len && is_attribute_name_char(bytes[k]) {
            k += 1;
        }
        if name_start == k {
            // Stray `=` or quote where a name should be.
            k += 1;
            continue;
        }
        let attribute_name = input[name_start..k].to_string();

        skip_whitespace(&mut k);
        let value = if k < len && bytes[k] == b'=' {
            k += 1;
            skip_whitespace(&mut k);
            if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                let quote = bytes[k];
                k += 1;
                let vstart = k;
                k = memchr(quote, &bytes[k..]).map_or(len, |rel| k + rel);
                let raw = &input[vstart..k];
                if k < len {
                    k += 1;
                }
                decode_attribute(raw).into_owned()
            } else {
                let vstart = k;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                        break;
                    }
                    k += 1;
                }
                decode_attribute(&input[vstart..k]).into_owned()
            }
        } else {
            String::new()
        };
        attributes.push((attribute_name, value));
    }

    (
        Token::StartTag {
            name,
            attributes,
            self_closing,
        },
        k,
    )
}
