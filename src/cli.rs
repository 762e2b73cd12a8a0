use crate::config::ENV_API_URL;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "speak-football")]
#[command(about = "Find the latest football events around you", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the backend origin (e.g. http://localhost:8000)
    #[arg(long, global = true, env = ENV_API_URL)]
    pub api_url: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(flatten)]
    Session(SessionCommand),
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Everything that talks to the backend and needs the stored session.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Open the landing page and its menu
    Home,
    /// Log in to your account
    Login,
    /// Create a new account
    Signup,
    /// End the current session
    Logout,
    /// Show who is logged in
    Whoami,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the backend URL in effect
    Show,
    /// Save a backend URL to the config file
    SetUrl {
        /// Backend origin, without the /api suffix
        url: String,
    },
}
