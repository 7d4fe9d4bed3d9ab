//! Hard wrapping by display columns, shared by the writing area and the read-only view so the
//! rows on screen and the scroll limits agree.

use std::ops::Range;

use unicode_width::UnicodeWidthChar;

/// Splits `text` into screen rows at most `width` columns wide. Each row is a byte range of
/// `text` without the newline. Every `\n` separated line gets at least one row, and a character
/// wider than the whole row still gets a row of its own.
pub fn wrap_rows(text: &str, width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut rows = vec![];
    let mut line_start = 0;

    for line in text.split('\n') {
        let mut row_start = line_start;
        let mut col = 0;
        for (i, ch) in line.char_indices() {
            let ch_width = ch.width().unwrap_or(0);
            let at = line_start + i;
            if col + ch_width > width && at > row_start {
                rows.push(row_start..at);
                row_start = at;
                col = 0;
            }
            col += ch_width;
        }
        let line_end = line_start + line.len();
        rows.push(row_start..line_end);
        line_start = line_end + 1;
    }

    rows
}
