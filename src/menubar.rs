use std::io::Write;

use crossterm::{queue, style};

/// Print a hint line, bolding any text inside `[...]` brackets and dimming
/// the rest. Output stops after `max_width` chars.
pub fn print_menu_item<W: Write>(out: &mut W, item: &str, max_width: usize) -> anyhow::Result<()> {
    let mut budget = max_width;
    let mut rest = item;
    while !rest.is_empty() && budget > 0 {
        let (chunk, bold) = match rest.find('[') {
            Some(0) => match rest.find(']') {
                Some(close) => (&rest[..=close], true),
                None => (rest, false),
            },
            Some(open) => (&rest[..open], false),
            None => (rest, false),
        };
        rest = &rest[chunk.len()..];

        let shown: String = chunk.chars().take(budget).collect();
        budget -= shown.chars().count();
        let attr = if bold {
            style::Attribute::Bold
        } else {
            style::Attribute::Dim
        };
        queue!(
            out,
            style::SetAttribute(attr),
            style::Print(shown),
            style::SetAttribute(style::Attribute::Reset),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(item: &str, width: usize) -> String {
        let mut out = Vec::new();
        print_menu_item(&mut out, item, width).unwrap();
        let raw = String::from_utf8(out).unwrap();
        // Drop SGR sequences to compare only the visible text.
        let mut visible = String::new();
        let mut in_escape = false;
        for c in raw.chars() {
            match (in_escape, c) {
                (false, '\x1b') => in_escape = true,
                (true, 'm') => in_escape = false,
                (false, c) => visible.push(c),
                _ => {}
            }
        }
        visible
    }

    #[test]
    fn prints_all_text_when_it_fits() {
        assert_eq!(plain("[Tab] spin  [q] quit", 80), "[Tab] spin  [q] quit");
    }

    #[test]
    fn truncates_to_width() {
        assert_eq!(plain("[Tab] spin", 7), "[Tab] s");
    }

    #[test]
    fn unclosed_bracket_is_printed_plain() {
        assert_eq!(plain("a [b", 10), "a [b");
    }
}
