//! Highlight tag repair.

use crate::mask::LINE_BREAK;
use crate::Color;

/// Longest color name we bother looking at after a `[`.
const MAX_COLOR_NAME: usize = 8;

struct OpenTag {
    tag_start: usize,
    content_start: usize,
    nested: usize,
}

/// Repair `[color:...]` tags so every palette highlight is closed, flat,
/// lower-case and non-empty.
///
/// - `[Red:x]` becomes `[red:x]`
/// - an opener inside an open highlight is dropped together with its `]`
/// - a highlight still open at a line break or the end of text is closed there
/// - `[red:]` and `[red:   ]` disappear
///
/// The output is a fixed point: balancing it again changes nothing.
pub fn balance_highlights(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut open: Option<OpenTag> = None;
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if let Some((color, consumed)) = parse_opener(rest) {
            match open.as_mut() {
                Some(tag) => tag.nested += 1,
                None => {
                    let tag_start = out.len();
                    out.push('[');
                    out.push_str(color.name());
                    out.push(':');
                    open = Some(OpenTag {
                        tag_start,
                        content_start: out.len(),
                        nested: 0,
                    });
                }
            }
            i += consumed;
            continue;
        }
        let Some(ch) = rest.chars().next() else {
            break;
        };
        i += ch.len_utf8();
        match ch {
            ']' if open.is_some() => {
                if let Some(tag) = open.as_mut() {
                    if tag.nested > 0 {
                        tag.nested -= 1;
                        continue;
                    }
                }
                close_tag(&mut out, open.take());
            }
            '\n' | '\r' | LINE_BREAK if open.is_some() => {
                close_tag(&mut out, open.take());
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    close_tag(&mut out, open.take());
    out
}

fn close_tag(out: &mut String, tag: Option<OpenTag>) {
    let Some(tag) = tag else {
        return;
    };
    let trimmed_len = out[tag.content_start..].trim_end().len();
    if trimmed_len == 0 {
        out.truncate(tag.tag_start);
        return;
    }
    out.truncate(tag.content_start + trimmed_len);
    out.push(']');
}

fn parse_opener(rest: &str) -> Option<(Color, usize)> {
    let body = rest.strip_prefix('[')?;
    let name_len = body
        .bytes()
        .take(MAX_COLOR_NAME + 1)
        .take_while(u8::is_ascii_alphabetic)
        .count();
    if name_len == 0 || name_len > MAX_COLOR_NAME {
        return None;
    }
    if body.as_bytes().get(name_len) != Some(&b':') {
        return None;
    }
    let color = Color::from_name_loose(&body[..name_len])?;
    Some((color, 1 + name_len + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_is_untouched() {
        let text = "x = [red:4] and [blue:y = 2]";
        assert_eq!(balance_highlights(text), text);
    }

    #[test]
    fn lowercases_color_names() {
        assert_eq!(balance_highlights("[Green:ok]"), "[green:ok]");
    }

    #[test]
    fn closes_at_line_end() {
        assert_eq!(
            balance_highlights("[red:x = 4 \nnext"),
            "[red:x = 4]\nnext"
        );
        assert_eq!(balance_highlights("ans [blue:7"), "ans [blue:7]");
    }

    #[test]
    fn flattens_nested_tags() {
        assert_eq!(
            balance_highlights("[red:a [blue:b] c]"),
            "[red:a b c]"
        );
    }

    #[test]
    fn drops_empty_tags() {
        assert_eq!(balance_highlights("a [red:] b [blue:  ]"), "a  b ");
    }

    #[test]
    fn unknown_colors_are_plain_text() {
        let text = "[pink:x] and [note: y]";
        assert_eq!(balance_highlights(text), text);
    }

    #[test]
    fn fixed_point() {
        let once = balance_highlights("[RED:a [blue:b] c\n[green:");
        assert_eq!(balance_highlights(&once), once);
    }
}
