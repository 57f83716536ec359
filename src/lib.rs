//! parkwatch library root.
//! Exposes the CLI parser, the high-level run() function and the parking
//! core (geo ranking, session state machine, reminders, persistence).

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Districts { .. } => commands::district::handle_list(cli, cfg),
        Commands::District { .. } => commands::district::handle(cli, cfg),
        Commands::Enter { .. } | Commands::Checkout | Commands::Exit | Commands::Delay => {
            commands::session::handle(cli, cfg)
        }
        Commands::Status => commands::status::handle_status(cli, cfg),
        Commands::Watch { .. } => commands::status::handle_watch(cli, cfg),
        Commands::Settings { .. } => commands::settings::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // load config once
    let mut cfg = Config::load();

    // --db overrides the configured database
    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::expand_tilde(custom_db)
            .to_string_lossy()
            .to_string();
    }

    dispatch(&cli, &cfg)
}
