//! Text processing utilities for terminal rendering
//!
//! Unicode-aware width calculation and wrapping used when printing
//! search results.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap text to fit within `max_width` columns, breaking at word boundaries.
/// Words wider than a line are split by character.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines: Vec<String> = Vec::new();

    for line in text.lines() {
        if text_width(line) <= max_width {
            lines.push(line.to_string());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0;

        for word in line.split_whitespace() {
            let word_width = text_width(word);

            if word_width > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                for ch in word.chars() {
                    let ch_width = char_width(ch);
                    if current_width + ch_width > max_width && !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0;
                    }
                    current.push(ch);
                    current_width += ch_width;
                }
                continue;
            }

            if current_width > 0 && current_width + 1 + word_width > max_width {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Cut text to at most `max_width` columns, marking the cut with an ellipsis
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text_width(text) <= max_width {
        return text.to_string();
    }

    let mut result = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let ch_width = char_width(ch);
        if width + ch_width + 1 > max_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.push('…');
    result
}

/// Get terminal width with fallback
pub fn terminal_width() -> usize {
    match crossterm::terminal::size() {
        // Leave room for the result indent
        Ok((cols, _)) => (cols as usize).saturating_sub(4).max(30),
        Err(_) => 76,
    }
}

/// Calculate the display width of text considering Unicode characters
pub fn text_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Calculate the display width of a single character
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}
