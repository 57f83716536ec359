use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single active parking episode.
///
/// Timestamps are stored as epoch milliseconds. `checkoutTime` is omitted
/// while parked; a legacy explicit `null` still loads as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSession {
    pub district_id: String,
    #[serde(with = "ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    pub expected_duration_hours: u32,
    #[serde(
        default,
        with = "ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub checkout_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delay_hours: u32,
}

impl ParkingSession {
    pub fn new(district_id: &str, start_time: DateTime<Utc>, expected_duration_hours: u32) -> Self {
        Self {
            district_id: district_id.to_string(),
            start_time,
            expected_duration_hours,
            checkout_time: None,
            delay_hours: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.checkout_time.is_some() {
            SessionState::CheckedOut
        } else {
            SessionState::Parked
        }
    }

    pub fn is_checked_out(&self) -> bool {
        self.checkout_time.is_some()
    }
}

/// Lifecycle phase, derived from the presence and shape of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Parked,
    CheckedOut,
}

impl SessionState {
    pub fn of(session: Option<&ParkingSession>) -> Self {
        session.map_or(SessionState::Idle, ParkingSession::state)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Parked => "parked",
            SessionState::CheckedOut => "checked out",
        }
    }
}
