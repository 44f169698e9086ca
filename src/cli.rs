use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ccs", version, about = "Claude Code Switcher - manage and switch between Claude Code configuration profiles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a profile with interactive prompts for ANTHROPIC_AUTH_TOKEN, ANTHROPIC_BASE_URL, the three ANTHROPIC_DEFAULT_*_MODEL overrides and ANTHROPIC_MODEL. Use --env to pre-fill values.
    Add {
        /// Profile name
        name: String,
        /// Pre-filled values (can be used multiple times: --env KEY=VALUE)
        #[arg(long)]
        env: Vec<String>,
    },
    /// List saved profiles (shows the active profile)
    #[command(alias = "list")]
    Ls,
    /// Switch Claude Code settings to a profile
    #[command(alias = "switch")]
    Use { name: String },
    /// Remove a profile
    #[command(alias = "remove")]
    Rm { name: String },
    /// Rename a profile
    Rename { origin: String, new: String },
    /// Show a profile's values (tokens are masked)
    Show {
        name: String,
        /// Print secrets unmasked
        #[arg(long)]
        reveal: bool,
    },
    /// Set one variable of a profile, e.g. `ccs set work ANTHROPIC_MODEL claude-sonnet-4`
    Set {
        name: String,
        key: String,
        value: String,
    },
    /// Remove one variable from a profile
    Unset { name: String, key: String },
    /// Import the variables currently in Claude settings as a new profile
    Import { name: String },
    /// Print the active profile
    Current,
    /// List backups of Claude settings, newest first
    Backups,
    /// Launch the interactive terminal UI
    Ui,
}
