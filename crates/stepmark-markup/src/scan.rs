//! Token grammar scanner.
//!
//! Every grammar starts on an ASCII byte, so the scanner walks bytes and only
//! ever slices at ASCII positions.

use crate::mask::{LINE_BREAK, MASK_CLOSE, MASK_OPEN};
use crate::Color;

const IMAGE_REQUEST_PREFIX: &str = "[IMAGE NEEDED:";
const IMAGE_LINK_PREFIX: &str = "[IMAGE:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Fraction,
    Subscript,
    Superscript,
    Highlight(Color),
    ImageRequest,
    ImageLink,
}

/// Byte range of one well-formed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    pub fn as_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Find every well-formed token, leftmost first, without overlaps.
///
/// Malformed or unterminated tokens are skipped and stay plain text.
pub fn scan_tokens(text: &str) -> Vec<TokenSpan> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let found = match bytes[i] {
            b'[' => match_bracket(text, i),
            b'{' => match_fraction(text, i),
            b if b.is_ascii_alphanumeric() && (i == 0 || !bytes[i - 1].is_ascii_alphanumeric()) => {
                match_script(text, i)
            }
            _ => None,
        };
        match found {
            Some(span) => {
                i = span.end;
                spans.push(span);
            }
            None => i += 1,
        }
    }
    spans
}

fn breaks_token(ch: char) -> bool {
    ch == '\n' || ch == '\r' || ch == LINE_BREAK || ch == MASK_OPEN || ch == MASK_CLOSE
}

/// `{numerator/denominator}`, both sides non-empty, no nesting, one line.
fn match_fraction(text: &str, start: usize) -> Option<TokenSpan> {
    let rest = &text[start + 1..];
    let close = rest.find('}')?;
    let inner = &rest[..close];
    if inner.contains('{') || inner.chars().any(breaks_token) {
        return None;
    }
    let (num, den) = inner.split_once('/')?;
    if num.trim().is_empty() || den.trim().is_empty() {
        return None;
    }
    Some(TokenSpan {
        kind: TokenKind::Fraction,
        start,
        end: start + 1 + close + 1,
    })
}

/// `base_sub_` or `base^sup^` where `base` is an alphanumeric run and the
/// body holds no whitespace or braces.
fn match_script(text: &str, start: usize) -> Option<TokenSpan> {
    let bytes = text.as_bytes();
    let mut j = start;
    while j < bytes.len() && bytes[j].is_ascii_alphanumeric() {
        j += 1;
    }
    let delim = *bytes.get(j)?;
    let kind = match delim {
        b'_' => TokenKind::Subscript,
        b'^' => TokenKind::Superscript,
        _ => return None,
    };
    let body_start = j + 1;
    let rest = text.get(body_start..)?;
    let mut body_len = None;
    for (offset, ch) in rest.char_indices() {
        if ch as u32 == delim as u32 {
            body_len = Some(offset);
            break;
        }
        if ch.is_whitespace() || ch == '{' || ch == '}' || breaks_token(ch) {
            return None;
        }
    }
    match body_len {
        Some(len) if len > 0 => Some(TokenSpan {
            kind,
            start,
            end: body_start + len + 1,
        }),
        _ => None,
    }
}

fn match_bracket(text: &str, start: usize) -> Option<TokenSpan> {
    let rest = &text[start..];
    if rest.starts_with(IMAGE_REQUEST_PREFIX) {
        let close = single_line_find(rest, ']')?;
        return Some(TokenSpan {
            kind: TokenKind::ImageRequest,
            start,
            end: start + close + 1,
        });
    }
    if rest.starts_with(IMAGE_LINK_PREFIX) {
        let caption_end = single_line_find(rest, ']')?;
        let after = &rest[caption_end + 1..];
        if !after.starts_with('(') {
            return None;
        }
        let url_end = single_line_find(after, ')')?;
        return Some(TokenSpan {
            kind: TokenKind::ImageLink,
            start,
            end: start + caption_end + 1 + url_end + 1,
        });
    }
    match_highlight(rest).map(|(color, len)| TokenSpan {
        kind: TokenKind::Highlight(color),
        start,
        end: start + len,
    })
}

/// `[color:content]` with a lower-case palette name and non-empty content.
fn match_highlight(rest: &str) -> Option<(Color, usize)> {
    let colon = rest.find(':')?;
    let color = Color::from_name(&rest[1..colon])?;
    let body = &rest[colon + 1..];
    let mut close = None;
    for (offset, ch) in body.char_indices() {
        match ch {
            ']' => {
                close = Some(offset);
                break;
            }
            '[' => return None,
            c if breaks_token(c) => return None,
            _ => {}
        }
    }
    let close = close?;
    if body[..close].trim().is_empty() {
        return None;
    }
    Some((color, colon + 1 + close + 1))
}

fn single_line_find(haystack: &str, needle: char) -> Option<usize> {
    for (offset, ch) in haystack.char_indices() {
        if ch == needle {
            return Some(offset);
        }
        if breaks_token(ch) {
            return None;
        }
    }
    None
}
