use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Remove control characters and ANSI escape sequences from remote text.
///
/// Titles and overviews come straight from the catalog API and end up in the
/// terminal, so anything that could move the cursor or change colours goes.
/// Newlines and tabs are kept. Clean input is returned borrowed.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            if !is_stripped(c) {
                out.push(c);
            }
            continue;
        }

        match chars.peek() {
            // CSI: parameters until a final byte in @..~
            Some('[') => {
                chars.next();
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
            // OSC: until BEL or ST
            Some(']') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    Cow::Owned(out)
}

fn is_stripped(c: char) -> bool {
    c.is_control() && !matches!(c, '\n' | '\t')
}

/// Shorten `s` to at most `max_width` terminal columns, ending in an ellipsis
/// when anything was cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    let mut width = 0;
    let mut keep = 0;
    // Byte offset where the text must stop to leave a column for the ellipsis.
    let mut ellipsis_cut = 0;

    for (idx, c) in s.char_indices() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width {
            if max_width == 0 {
                return Cow::Borrowed("");
            }
            let mut out = s[..ellipsis_cut].to_string();
            out.push(ELLIPSIS);
            return Cow::Owned(out);
        }
        width += w;
        keep = idx + c.len_utf8();
        if width < max_width {
            ellipsis_cut = keep;
        }
    }

    debug_assert_eq!(keep, s.len());
    Cow::Borrowed(s)
}

/// Break `s` into lines of at most `max_width` columns at word boundaries.
///
/// Words wider than a line are split mid-word. Blank lines are dropped.
pub fn wrap_to_width(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if max_width == 0 {
        return lines;
    }

    for paragraph in s.lines() {
        let mut line = String::new();
        let mut line_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            let gap = usize::from(!line.is_empty());
            if line_width + gap + word_width <= max_width {
                if gap == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_width += gap + word_width;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            if word_width <= max_width {
                line.push_str(word);
                line_width = word_width;
                continue;
            }
            for c in word.chars() {
                let w = c.width().unwrap_or(0);
                if line_width + w > max_width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(c);
                line_width += w;
            }
        }

        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_text_is_borrowed() {
        let result = strip_control_chars("The Godfather\nPart II");
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_strips_csi_sequences() {
        assert_eq!(strip_control_chars("\x1b[31mRed\x1b[0m Dawn"), "Red Dawn");
    }

    #[test]
    fn test_strips_osc_sequences() {
        assert_eq!(
            strip_control_chars("\x1b]0;pwned\x07Heat"),
            "Heat"
        );
        assert_eq!(
            strip_control_chars("\x1b]8;;http://x\x1b\\Link"),
            "Link"
        );
    }

    #[test]
    fn test_strips_bare_controls_keeps_whitespace() {
        assert_eq!(strip_control_chars("a\x00b\x07c\td\re"), "abc\tde");
    }

    #[test]
    fn test_truncate_fits() {
        let result = truncate_to_width("Alien", 5);
        assert_eq!(result, "Alien");
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Spirited Away", 8), "Spirite…");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each ideograph is two columns
        assert_eq!(truncate_to_width("千と千尋の神隠し", 7), "千と千…");
    }

    #[test]
    fn test_truncate_zero_width() {
        assert_eq!(truncate_to_width("Up", 0), "");
        assert_eq!(truncate_to_width("", 0), "");
    }

    #[test]
    fn test_truncate_single_column() {
        assert_eq!(truncate_to_width("Up", 1), "…");
    }

    #[test]
    fn test_wrap_at_word_boundaries() {
        assert_eq!(
            wrap_to_width("A family saga set in postwar New York", 16),
            vec!["A family saga", "set in postwar", "New York"]
        );
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap_to_width("Supercalifragilistic", 8), vec!["Supercal", "ifragili", "stic"]);
    }

    #[test]
    fn test_wrap_counts_columns_not_bytes() {
        let lines = wrap_to_width("千と千尋の神隠し", 6);
        assert_eq!(lines, vec!["千と千", "尋の神", "隠し"]);
    }

    #[test]
    fn test_wrap_keeps_paragraphs_and_drops_blank_lines() {
        assert_eq!(wrap_to_width("One.\n\nTwo.", 20), vec!["One.", "Two."]);
        assert!(wrap_to_width("anything", 0).is_empty());
        assert!(wrap_to_width("   ", 10).is_empty());
    }
}
