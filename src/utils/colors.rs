/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";

/// Countdown color:
/// overdue → red
/// under 15 minutes → yellow
/// otherwise → green
pub fn color_for_countdown(secs_left: i64) -> &'static str {
    if secs_left <= 0 {
        RED
    } else if secs_left < 15 * 60 {
        YELLOW
    } else {
        GREEN
    }
}

pub fn grey(value: &str) -> String {
    format!("{GREY}{value}{RESET}")
}
