mod api;
mod cli;
mod codec;
mod config;
mod route;
mod session;
mod state;
mod validate;

#[cfg(test)]
mod testing;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;
use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional; VITE_API_URL is shared with the web front end
    let _ = dotenvy::dotenv();

    env_logger::init();

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(url) = cli.api_url.as_deref() {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    log::info!("Using file repository at {}", config.api_url);

    let state = if cli.ephemeral {
        AppState::ephemeral(config)
    } else {
        AppState::with_keychain(config)
    };

    match cli::run(cli.command, &state).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
