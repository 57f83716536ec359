use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::utils::time::format_local;

use super::{open_state, position};

/// `enter`, `checkout`, `exit` and `delay`.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let mut state = open_state(cfg)?;

    match &cli.command {
        Commands::Enter { district, hours } => {
            let id = match district {
                Some(id) => id.clone(),
                None => {
                    let origin = position(cli)?;
                    state
                        .nearest(origin)
                        .map(|d| d.id)
                        .ok_or_else(|| AppError::InvalidDistrict("the catalog is empty".into()))?
                }
            };
            let hours = hours.unwrap_or(state.settings().default_duration);

            let session = state.enter(&id, hours)?;
            let name = state
                .active_district()?
                .map(|d| d.name.clone())
                .unwrap_or_default();

            success(format!("Entered '{}' for {}h.", name, session.expected_duration_hours));
            if let Some(r) = state.next_reminder() {
                info(format!("Next reminder at {}", format_local(r.deadline)));
            }
        }

        Commands::Checkout => {
            state.checkout()?;
            success("Checked out. The exit window has started.");

            if let Some(d) = state.active_district()?
                && d.needs_operation
            {
                warning(format!(
                    "This district needs an extra step: pay via '{}' before leaving.",
                    d.payment_label()
                ));
            }
            if let Some(r) = state.next_reminder() {
                info(format!("Next reminder at {}", format_local(r.deadline)));
            }
        }

        Commands::Delay => {
            let s = state.delay()?;
            success(format!("Deadline pushed by one hour (total delay {}h).", s.delay_hours));
            if let Some(r) = state.next_reminder() {
                info(format!("Next reminder at {}", format_local(r.deadline)));
            }
        }

        Commands::Exit => match state.exit() {
            Some(_) => success("Session closed. Drive safely!"),
            None => info("No active session."),
        },

        _ => {}
    }

    Ok(())
}
