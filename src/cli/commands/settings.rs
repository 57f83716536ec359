use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{detail, success};

use super::open_state;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Settings { duration, reminder } = cmd {
        let mut state = open_state(cfg)?;

        if duration.is_some() || reminder.is_some() {
            let updated = state.settings().with_overrides(*duration, *reminder)?;
            state.update_settings(updated);
            success("Settings updated.");
        }

        let s = state.settings();
        detail("default duration", format!("{}h", s.default_duration));
        detail("reminder lead", format!("{} min", s.default_reminder));
    }

    Ok(())
}
