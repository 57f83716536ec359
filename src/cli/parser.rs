use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for parkwatch
#[derive(Parser)]
#[command(
    name = "parkwatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track a parking session, find the nearest district and get reminded before free parking runs out",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Current position as LAT,LNG (used to rank districts)
    #[arg(global = true, long = "at", env = "PARKWATCH_POSITION", value_name = "LAT,LNG")]
    pub at: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// List districts, nearest first when a position is known
    Districts {
        #[arg(long, short, help = "How many districts to show (default from config)")]
        limit: Option<usize>,
    },

    /// Add, edit or remove a district
    District {
        #[command(subcommand)]
        action: DistrictAction,
    },

    /// Start a parking session (nearest district when no id is given)
    Enter {
        /// District id
        district: Option<String>,

        #[arg(long, help = "Expected parking time in hours (default from settings)")]
        hours: Option<u32>,
    },

    /// Check out: end the parked phase and start the exit window
    Checkout,

    /// Leave the parking and close the session
    Exit,

    /// Push the current deadline one hour forward
    Delay,

    /// Show the active session and the next reminder
    Status,

    /// Refresh the countdown periodically
    Watch {
        #[arg(long, help = "Stop after this many refreshes")]
        ticks: Option<u64>,
    },

    /// Show or change the session defaults
    Settings {
        #[arg(long, help = "Default parking time in hours (1-5)")]
        duration: Option<u32>,

        #[arg(long, help = "Reminder lead time in minutes (1, 2, 3, 5, 10, 15)")]
        reminder: Option<u32>,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

#[derive(Subcommand)]
pub enum DistrictAction {
    /// Register a new district
    Add(DistrictFields),

    /// Change fields of an existing district
    Edit {
        id: String,

        #[command(flatten)]
        fields: DistrictFields,
    },

    /// Delete a district
    Rm { id: String },
}

#[derive(Args, Debug, Clone, Default)]
pub struct DistrictFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Take coordinates from the current position (--at)
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub here: bool,

    #[arg(long = "needs-operation", value_name = "BOOL")]
    pub needs_operation: Option<bool>,

    #[arg(long = "free", value_name = "HOURS", help = "Free parking hours")]
    pub free_duration: Option<u32>,

    #[arg(long = "exit", value_name = "MINUTES", help = "Minutes allowed to leave after checkout")]
    pub exit_duration: Option<u32>,

    #[arg(long = "account", help = "Payment account to follow before leaving")]
    pub payment_account: Option<String>,
}
