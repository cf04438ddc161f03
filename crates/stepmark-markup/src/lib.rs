//! The renderable markup dialect shared by every formatting pass.
//!
//! | Token | Meaning |
//! |---|---|
//! | `{a/b}` | vertical fraction |
//! | `x_sub_` | subscript |
//! | `x^sup^` | superscript |
//! | `[red:...]` (and the rest of [`Color::ALL`]) | colored highlight |
//! | `[IMAGE NEEDED: description]` | image request |
//! | `[IMAGE: caption](url)` | resolved image |
//!
//! [`scan_tokens`] finds well-formed tokens, [`mask`]/[`unmask`] swap them for
//! opaque sentinels and back, and [`balance_highlights`] repairs highlight tags
//! before anything is masked.

mod balance;
mod mask;
mod scan;

pub use balance::balance_highlights;
pub use mask::{
    contains_sentinel, is_internal_char, mask, unmask, MaskEntry, MaskImbalanceError, MaskTable,
    Masked, Unmasked, LINE_BREAK, MASK_CLOSE, MASK_OPEN,
};
pub use scan::{scan_tokens, TokenKind, TokenSpan};

/// Flow arrow marking the transition from working to a result.
pub const FLOW_ARROW: char = '→';

/// Highlight palette. Anything else inside `[name:...]` is plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Blue,
    Green,
    Orange,
    Purple,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Orange,
        Color::Purple,
        Color::Yellow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Orange => "orange",
            Color::Purple => "purple",
            Color::Yellow => "yellow",
        }
    }

    /// Exact (lower-case) palette lookup.
    pub fn from_name(name: &str) -> Option<Color> {
        Color::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Case-insensitive palette lookup, used when repairing model output.
    pub fn from_name_loose(name: &str) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_lookup() {
        assert_eq!(Color::from_name("red"), Some(Color::Red));
        assert_eq!(Color::from_name("Red"), None);
        assert_eq!(Color::from_name_loose("PURPLE"), Some(Color::Purple));
        assert_eq!(Color::from_name_loose("pink"), None);
    }
}
