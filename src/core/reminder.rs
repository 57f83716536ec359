//! Reminder deadline for the active session.
//!
//! Pure: recomputed on every tick, holds no timer of its own.

use crate::models::session::ParkingSession;
use crate::models::settings::Settings;
use chrono::{DateTime, TimeDelta, Utc};

/// Base exit window after checkout. Fixed, independent of the district's
/// `exit_duration`.
pub const EXIT_WINDOW_HOURS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reminder {
    pub deadline: DateTime<Utc>,
    /// `deadline - now`; zero or negative means overdue.
    pub due_in: TimeDelta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining(TimeDelta),
    Overdue,
}

impl Reminder {
    pub fn is_overdue(&self) -> bool {
        self.due_in <= TimeDelta::zero()
    }

    pub fn countdown(&self) -> Countdown {
        if self.is_overdue() {
            Countdown::Overdue
        } else {
            Countdown::Remaining(self.due_in)
        }
    }
}

/// Instant at which the reminder becomes due.
///
/// Saturates at the edges of the representable range, so an absurd stored
/// duration reads as "far away" instead of overflowing.
pub fn deadline(session: &ParkingSession, settings: &Settings) -> DateTime<Utc> {
    let lead = TimeDelta::minutes(settings.default_reminder as i64);
    let delay = session.delay_hours as i64;

    let (base, hours) = match session.checkout_time {
        Some(checkout) => (checkout, EXIT_WINDOW_HOURS + delay),
        None => (session.start_time, session.expected_duration_hours as i64 + delay),
    };

    TimeDelta::try_hours(hours)
        .and_then(|window| base.checked_add_signed(window))
        .and_then(|end| end.checked_sub_signed(lead))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn next_reminder(session: &ParkingSession, settings: &Settings, now: DateTime<Utc>) -> Reminder {
    let deadline = deadline(session, settings);
    Reminder {
        deadline,
        due_in: deadline - now,
    }
}
