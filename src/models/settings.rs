use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Hours offered as default session length.
pub const DURATION_CHOICES: [u32; 5] = [1, 2, 3, 4, 5];

/// Minutes offered as reminder lead time.
pub const REMINDER_CHOICES: [u32; 6] = [1, 2, 3, 5, 10, 15];

/// Process-wide defaults, persisted under the `settings` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Hours.
    pub default_duration: u32,
    /// Minutes before a deadline at which a reminder is due.
    pub default_reminder: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_duration: 2,
            default_reminder: 3,
        }
    }
}

impl Settings {
    /// Return a copy with the given overrides applied, rejecting values
    /// outside the offered choices.
    pub fn with_overrides(&self, duration: Option<u32>, reminder: Option<u32>) -> AppResult<Self> {
        let mut out = *self;

        if let Some(d) = duration {
            out.default_duration = check_duration(d).map_err(|_| {
                AppError::InvalidSetting(format!(
                    "default duration must be one of {:?} hours, got {}",
                    DURATION_CHOICES, d
                ))
            })?;
        }

        if let Some(r) = reminder {
            if !REMINDER_CHOICES.contains(&r) {
                return Err(AppError::InvalidSetting(format!(
                    "reminder lead must be one of {:?} minutes, got {}",
                    REMINDER_CHOICES, r
                )));
            }
            out.default_reminder = r;
        }

        Ok(out)
    }
}

/// Accept only the session lengths the entry screen offers.
pub fn check_duration(hours: u32) -> AppResult<u32> {
    if DURATION_CHOICES.contains(&hours) {
        Ok(hours)
    } else {
        Err(AppError::InvalidDuration(hours))
    }
}
