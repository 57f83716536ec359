//! Formatting utilities used for CLI output.

use unicode_width::UnicodeWidthStr;

/// Pad to `width` terminal columns (CJK names count double).
pub fn pad_right(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(w)))
}

/// Rounded metres, empty when there is no distance (no fix, or on the spot).
pub fn format_distance(meters: Option<f64>) -> String {
    match meters {
        Some(m) if m.round() > 0.0 => format!("{}m", m.round() as u64),
        _ => String::new(),
    }
}

pub fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}
