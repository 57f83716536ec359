//! Time utilities: countdown formatting and local timestamps.

use chrono::{DateTime, Local, TimeDelta, Utc};

/// `HH:MM:SS`, hours not wrapped at 24. Negative values are shown as zero.
pub fn format_hms(d: TimeDelta) -> String {
    let secs = d.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Local wall-clock rendering of a stored UTC instant. The saturated
/// "no deadline" instant reads as `never`.
pub fn format_local(ts: DateTime<Utc>) -> String {
    if ts == DateTime::<Utc>::MAX_UTC {
        return "never".to_string();
    }
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
