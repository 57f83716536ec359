//! Parking session lifecycle: Idle → Parked → CheckedOut → Idle.
//!
//! The machine owns the one optional `ParkingSession`. Every transition is
//! validated against the current phase and returns the resulting session,
//! so callers never mutate a stale copy.

use crate::errors::{AppError, AppResult};
use crate::models::district::District;
use crate::models::session::{ParkingSession, SessionState};
use crate::models::settings::check_duration;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

#[derive(Debug, Default, Clone)]
pub struct SessionMachine {
    session: Option<ParkingSession>,
}

impl SessionMachine {
    pub fn new(session: Option<ParkingSession>) -> Self {
        Self { session }
    }

    pub fn state(&self) -> SessionState {
        SessionState::of(self.session.as_ref())
    }

    pub fn session(&self) -> Option<&ParkingSession> {
        self.session.as_ref()
    }

    /// Start a session at `district_id`.
    pub fn enter(
        &mut self,
        catalog: &[District],
        district_id: &str,
        duration_hours: u32,
        now: DateTime<Utc>,
    ) -> AppResult<ParkingSession> {
        if self.session.is_some() {
            return Err(self.invalid("enter"));
        }
        if !catalog.iter().any(|d| d.id == district_id) {
            return Err(AppError::UnknownDistrict(district_id.to_string()));
        }
        check_duration(duration_hours)?;

        let session = ParkingSession::new(district_id, now, duration_hours);
        debug!(district = district_id, hours = duration_hours, "session entered");
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Close the parked phase and open the exit window.
    pub fn checkout(&mut self, now: DateTime<Utc>) -> AppResult<ParkingSession> {
        let state = self.state();
        match self.session.as_mut() {
            Some(s) if state == SessionState::Parked => {
                s.checkout_time = Some(now);
                // the exit window has its own delay counter
                s.delay_hours = 0;

                debug!(district = %s.district_id, "session checked out");
                Ok(s.clone())
            }
            _ => Err(AppError::InvalidTransition {
                operation: "checkout",
                state: state.label(),
            }),
        }
    }

    /// Push the active deadline one hour forward.
    pub fn delay(&mut self) -> AppResult<ParkingSession> {
        let Some(s) = self.session.as_mut() else {
            return Err(AppError::InvalidTransition {
                operation: "delay",
                state: SessionState::Idle.label(),
            });
        };
        s.delay_hours = s.delay_hours.saturating_add(1);

        debug!(delay_hours = s.delay_hours, "session delayed");
        Ok(s.clone())
    }

    /// Drop the session. Already idle is a no-op; returns what was discarded.
    pub fn exit(&mut self) -> Option<ParkingSession> {
        let old = self.session.take();
        if old.is_some() {
            debug!("session exited");
        }
        old
    }

    /// Time spent in the current phase, clamped to zero on clock skew.
    pub fn elapsed(&self, now: DateTime<Utc>) -> TimeDelta {
        match &self.session {
            Some(s) => elapsed_at(s, now),
            None => TimeDelta::zero(),
        }
    }

    /// Like [`elapsed`](Self::elapsed) but reports clock skew instead of
    /// clamping.
    pub fn checked_elapsed(&self, now: DateTime<Utc>) -> AppResult<TimeDelta> {
        match &self.session {
            Some(s) => {
                let raw = now - phase_start(s);
                if raw < TimeDelta::zero() {
                    Err(AppError::ClockSkew(-raw.num_milliseconds()))
                } else {
                    Ok(raw)
                }
            }
            None => Ok(TimeDelta::zero()),
        }
    }

    /// Re-resolve the session's district against the current catalog.
    ///
    /// `Ok(None)` when idle; `DanglingSession` when the district was removed
    /// after entry.
    pub fn active_district<'a>(&self, catalog: &'a [District]) -> AppResult<Option<&'a District>> {
        let Some(s) = &self.session else {
            return Ok(None);
        };
        catalog
            .iter()
            .find(|d| d.id == s.district_id)
            .map(Some)
            .ok_or_else(|| AppError::DanglingSession(s.district_id.clone()))
    }

    fn invalid(&self, operation: &'static str) -> AppError {
        AppError::InvalidTransition {
            operation,
            state: self.state().label(),
        }
    }
}

/// Start of the phase the elapsed clock measures.
fn phase_start(s: &ParkingSession) -> DateTime<Utc> {
    s.checkout_time.unwrap_or(s.start_time)
}

pub fn elapsed_at(s: &ParkingSession, now: DateTime<Utc>) -> TimeDelta {
    let raw = now - phase_start(s);
    if raw < TimeDelta::zero() {
        warn!(
            skew_ms = -raw.num_milliseconds(),
            "clock is behind the recorded session time, clamping elapsed to zero"
        );
        return TimeDelta::zero();
    }
    raw
}
