mod commands;

use std::sync::Arc;

use clap::Parser;

use blueming_client::config::{Config, SessionBackend};
use blueming_client::ApiClient;

#[derive(Parser, Debug)]
#[command(name = "blueming", version, about = "Command-line client for the Blueming backend")]
struct Cli {
    /// Backend base URL (overrides BLUEMING_API_URL / VITE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where tokens are stored: file or keychain (overrides BLUEMING_SESSION)
    #[arg(long, global = true)]
    session: Option<SessionBackend>,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let cli = Cli::parse();

    let config = match Config::resolve(cli.api_url, cli.session) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };
    let session = match config.session_store() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };
    log::info!(
        "Using backend {} with {} session storage",
        config.api_base_url,
        session.name()
    );

    let client = ApiClient::new(&config.api_base_url, Arc::clone(&session));
    if let Err(e) = commands::run(cli.command, &client).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
