//! Reversible masking of markup tokens.
//!
//! A masked token becomes `MASK_OPEN <index> MASK_CLOSE`, built from
//! private-use code points so no pass can mistake it for text, whitespace,
//! a colon, or a list marker.

use std::fmt;

use crate::scan::{scan_tokens, TokenKind};

pub const MASK_OPEN: char = '\u{E000}';
pub const MASK_CLOSE: char = '\u{E001}';
/// Logical line break inserted by passes; finalization turns it into `\n`.
pub const LINE_BREAK: char = '\u{E00A}';

/// True for the private-use characters this crate reserves.
pub fn is_internal_char(ch: char) -> bool {
    ch == MASK_OPEN || ch == MASK_CLOSE || ch == LINE_BREAK
}

pub fn contains_sentinel(text: &str) -> bool {
    text.chars().any(is_internal_char)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskEntry {
    pub kind: TokenKind,
    pub original: String,
}

/// Originals indexed by sentinel number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskTable {
    entries: Vec<MaskEntry>,
}

impl MaskTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MaskEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[MaskEntry] {
        &self.entries
    }

    pub fn sentinel(index: usize) -> String {
        format!("{}{}{}", MASK_OPEN, index, MASK_CLOSE)
    }

    fn push(&mut self, kind: TokenKind, original: &str) -> usize {
        self.entries.push(MaskEntry {
            kind,
            original: original.to_string(),
        });
        self.entries.len() - 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Masked {
    pub text: String,
    pub table: MaskTable,
}

/// Replace every well-formed token with a positionally unique sentinel.
///
/// Sentinels never match a token grammar, so masking masked text is a no-op
/// apart from the (empty) table.
pub fn mask(text: &str) -> Masked {
    let spans = scan_tokens(text);
    let mut table = MaskTable::default();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&text[last..span.start]);
        let index = table.push(span.kind, span.as_str(text));
        out.push_str(&MaskTable::sentinel(index));
        last = span.end;
    }
    out.push_str(&text[last..]);
    Masked { text: out, table }
}

/// Result of [`unmask`]. Unknown sentinels are left in `text` verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unmasked {
    pub text: String,
    pub restored: Vec<usize>,
    pub unknown: Vec<String>,
}

impl Unmasked {
    /// Every entry restored exactly once and nothing unknown left behind.
    pub fn check(&self, table: &MaskTable) -> Result<(), MaskImbalanceError> {
        let mut seen = vec![0u32; table.len()];
        for &index in &self.restored {
            if let Some(slot) = seen.get_mut(index) {
                *slot += 1;
            }
        }
        if self.unknown.is_empty() && seen.iter().all(|&n| n == 1) {
            Ok(())
        } else {
            Err(MaskImbalanceError {
                masked: table.len(),
                restored: self.restored.len(),
                unknown: self.unknown.len(),
            })
        }
    }
}

/// Masked tokens emitted and restored do not line up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskImbalanceError {
    pub masked: usize,
    pub restored: usize,
    pub unknown: usize,
}

impl fmt::Display for MaskImbalanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mask imbalance: {} masked, {} restored, {} unknown sentinels",
            self.masked, self.restored, self.unknown
        )
    }
}

impl std::error::Error for MaskImbalanceError {}

/// Restore sentinels from `table`. Never panics.
pub fn unmask(text: &str, table: &MaskTable) -> Unmasked {
    let mut out = String::with_capacity(text.len());
    let mut restored = Vec::new();
    let mut unknown = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find(MASK_OPEN) {
        out.push_str(&rest[..open]);
        let after = &rest[open + MASK_OPEN.len_utf8()..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let closes = after[digits..].starts_with(MASK_CLOSE);
        let entry = if digits > 0 && closes {
            after[..digits]
                .parse::<usize>()
                .ok()
                .and_then(|i| table.get(i).map(|e| (i, e)))
        } else {
            None
        };
        match entry {
            Some((index, entry)) => {
                out.push_str(&entry.original);
                restored.push(index);
                rest = &after[digits + MASK_CLOSE.len_utf8()..];
            }
            None => {
                let consumed = if closes {
                    digits + MASK_CLOSE.len_utf8()
                } else {
                    digits
                };
                let literal = &rest[open..open + MASK_OPEN.len_utf8() + consumed];
                out.push_str(literal);
                unknown.push(literal.to_string());
                rest = &after[consumed..];
            }
        }
    }
    out.push_str(rest);
    Unmasked {
        text: out,
        restored,
        unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_replaces_tokens_with_sentinels() {
        let masked = mask("a {1/2} b");
        assert_eq!(masked.table.len(), 1);
        assert_eq!(masked.text, format!("a {} b", MaskTable::sentinel(0)));
        assert!(!masked.text.contains('/'));
    }

    #[test]
    fn unknown_sentinel_is_left_literal() {
        let table = MaskTable::default();
        let text = format!("x {} y", MaskTable::sentinel(3));
        let out = unmask(&text, &table);
        assert_eq!(out.text, text);
        assert_eq!(out.unknown.len(), 1);
        assert!(out.check(&table).is_err());
    }

    #[test]
    fn dropped_sentinel_is_detected() {
        let masked = mask("{1/2} and {3/4}");
        let without_second = masked.text.replace(&MaskTable::sentinel(1), "");
        let out = unmask(&without_second, &masked.table);
        let err = out.check(&masked.table).unwrap_err();
        assert_eq!(err.masked, 2);
        assert_eq!(err.restored, 1);
    }

    #[test]
    fn duplicated_sentinel_is_detected() {
        let masked = mask("{1/2}");
        let doubled = format!("{}{}", masked.text, masked.text);
        let out = unmask(&doubled, &masked.table);
        assert!(out.check(&masked.table).is_err());
    }

    #[test]
    fn stray_open_without_digits() {
        let text = format!("a{}b", MASK_OPEN);
        let out = unmask(&text, &MaskTable::default());
        assert_eq!(out.text, text);
        assert_eq!(out.unknown, vec![MASK_OPEN.to_string()]);
    }
}
