pub mod config;
pub mod district;
pub mod init;
pub mod log;
pub mod session;
pub mod settings;
pub mod status;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::state::ParkingState;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::position::GeoPoint;
use crate::ui::messages::warning;

/// Open the database and load the parking state, reporting any record that
/// had to be reset to defaults.
pub fn open_state(cfg: &Config) -> AppResult<ParkingState<DbPool>> {
    let pool = DbPool::open(&cfg.database)?;
    let state = ParkingState::open(pool);

    for key in state.recovered_keys() {
        warning(format!(
            "Stored '{}' was unreadable and has been reset to defaults.",
            key
        ));
    }

    Ok(state)
}

/// Position from `--at` / `PARKWATCH_POSITION`, if any.
pub fn position(cli: &Cli) -> AppResult<Option<GeoPoint>> {
    cli.at.as_deref().map(str::parse::<GeoPoint>).transpose()
}
