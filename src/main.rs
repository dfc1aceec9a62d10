#![allow(non_snake_case)]

use std::process::ExitCode;

use clap::Parser;

use assistantBot::cli::{self, Cli};
use assistantBot::config::{AppConfig, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = match AppConfig::load().and_then(|config| Settings::from_config(&config)) {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("configuration error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match cli::run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
