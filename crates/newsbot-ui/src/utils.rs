//! Text and time utilities for TUI rendering.

use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap text to fit within a given width, handling unicode safely.
///
/// Breaks at any character; see [`wrap_text_indented`] for word wrapping.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![];
    }

    let mut lines = Vec::new();

    for line in text.lines() {
        if line.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_width = 0;

        for ch in line.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);

            if current_width + ch_width > width && !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }

            current_line.push(ch);
            current_width += ch_width;
        }

        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Word-wrap text, prefixing every produced line with `indent`.
///
/// Words wider than the available width are split with [`wrap_text`].
pub fn wrap_text_indented(text: &str, width: usize, indent: &str) -> Vec<String> {
    let available = width.saturating_sub(UnicodeWidthStr::width(indent));
    if available == 0 {
        return vec![format!("{}{}", indent, text)];
    }

    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = UnicodeWidthStr::width(word);
            let gap = usize::from(!current.is_empty());

            if current_width + gap + word_width <= available {
                if gap == 1 {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += gap + word_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(format!("{}{}", indent, current));
                current.clear();
            }

            if word_width <= available {
                current.push_str(word);
                current_width = word_width;
            } else {
                let mut chunks = wrap_text(word, available);
                current = chunks.pop().unwrap_or_default();
                current_width = UnicodeWidthStr::width(current.as_str());
                lines.extend(chunks.into_iter().map(|c| format!("{}{}", indent, c)));
            }
        }

        lines.push(format!("{}{}", indent, current));
    }

    if lines.is_empty() {
        lines.push(indent.to_string());
    }

    lines
}

/// Truncate a string to fit within a given width, adding ellipsis if needed.
pub fn truncate(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    if max_width < 3 {
        return text.chars().take(max_width).collect();
    }

    let mut width = 0;
    let mut result = String::new();

    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);
        if width + ch_width > max_width - 3 {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result.push_str("...");
    result
}

/// How long ago `timestamp` was, relative to `now`.
///
/// `just now` under a minute (and for future timestamps), then whole
/// minutes, hours and days.
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds();
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

/// Clock time of a message, `HH:MM`.
pub fn format_clock(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}
