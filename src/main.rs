use anyhow::Context;
use clap::Parser;
use speak_football::api::ApiClient;
use speak_football::cli::{Cli, Commands, SessionCommand};
use speak_football::commands;
use speak_football::config::Config;
use speak_football::session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go through `log`. RUST_LOG=speak_football=debug shows every request.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Config { action } => {
            return commands::config(&action, cli.api_url.as_deref());
        }
        Commands::Session(command) => command,
    };

    let config = Config::load()?;
    let api_url = config.effective_api_url(cli.api_url.as_deref());
    let api = ApiClient::new(&api_url).with_context(|| format!("Invalid API URL {api_url}"))?;

    // Load whatever session the last run left behind. A broken store is
    // not worth failing over, we just start logged out.
    let store = SessionStore::open()?;
    if let Err(err) = store.restore(&api) {
        log::warn!("Could not restore session: {err:#}");
    }

    let result = match command {
        SessionCommand::Home => commands::home(&api).await,
        SessionCommand::Login => commands::login(&api).await,
        SessionCommand::Signup => commands::signup(&api).await,
        SessionCommand::Logout => commands::logout(&api).await,
        SessionCommand::Whoami => commands::whoami(&api).await,
    };

    // Write the jar back even if the command bailed (e.g. Ctrl-C in a prompt).
    store.persist(&api)?;
    result
}
