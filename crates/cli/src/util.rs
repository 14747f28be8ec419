// Terminal column helpers. Widths are Unicode display widths so accented
// text and CJK sheet names line up.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `width` display columns, ending in "…" when cut.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let budget = width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push(ELLIPSIS);
    out
}

/// Left-aligned cell of exactly `width` columns
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let cell = truncate_display(s, width);
    let pad = width.saturating_sub(display_width(&cell));
    format!("{}{}", cell, " ".repeat(pad))
}

/// Right-aligned cell of exactly `width` columns
pub(crate) fn pad_left(s: &str, width: usize) -> String {
    let cell = truncate_display(s, width);
    let pad = width.saturating_sub(display_width(&cell));
    format!("{}{}", " ".repeat(pad), cell)
}

/// Single-line form of a cell value for table output
pub(crate) fn one_line(s: &str) -> String {
    s.replace(['\r', '\n', '\t'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_wide_chars() {
        assert_eq!(display_width("Março"), 5);
        assert_eq!(display_width("\u{4e16}\u{754c}"), 4);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_display("abc", 3), "abc");
        assert_eq!(truncate_display("", 0), "");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_display("abcdef", 4), "abc…");
        assert_eq!(truncate_display("abcdef", 1), "…");
        assert_eq!(truncate_display("abcdef", 0), "");
    }

    #[test]
    fn truncate_respects_wide_boundary() {
        // 8 columns into 4: one wide char fits before the ellipsis
        let t = truncate_display("\u{4e16}\u{754c}\u{4f60}\u{597d}", 4);
        assert_eq!(t, "\u{4e16}…");
        assert!(display_width(&t) <= 4);
    }

    #[test]
    fn padding() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_left("7", 3), "  7");
        assert_eq!(pad_right("abcdef", 4), "abc…");
    }

    #[test]
    fn one_line_flattens_breaks() {
        assert_eq!(one_line("a\nb\tc"), "a b c");
    }
}
