//! Word wrapping by display width.
//!
//! Breaks on spaces when possible and splits words longer than the width.
//! Spacing inside a line is preserved; only the space at a break is dropped.

use unicode_width::UnicodeWidthChar;

/// Wrap `line` to at most `width` columns.
///
/// A width of zero disables wrapping. Always returns at least one line.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 || display_width(line) <= width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in line.split(' ') {
        let word_width = display_width(word);
        let separator = usize::from(!current.is_empty());

        if current_width + separator + word_width <= width {
            if separator == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_width += separator + word_width;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }

        // Hard-split words wider than a full line.
        split_into(word, width, &mut lines, &mut current, &mut current_width);
    }

    lines.push(current);
    lines
}

/// Split `line` every `width` columns regardless of word boundaries.
///
/// Used for the input line, where the cursor position must map directly onto
/// the wrapped rows.
pub(crate) fn split_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    split_into(line, width, &mut lines, &mut current, &mut current_width);
    lines.push(current);
    lines
}

fn split_into(
    text: &str,
    width: usize,
    lines: &mut Vec<String>,
    current: &mut String,
    current_width: &mut usize,
) {
    for c in text.chars() {
        let char_width = c.width().unwrap_or(0);
        if *current_width + char_width > width && !current.is_empty() {
            lines.push(std::mem::take(current));
            *current_width = 0;
        }
        current.push(c);
        *current_width += char_width;
    }
}

pub(crate) fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}
