// src/main.rs
use clap::Parser;
use cidtui::api::ApiClient;
use cidtui::config::Config;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::sync::Arc;

mod args;
mod commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = args::Args::parse();

    // The browser owns the terminal, so it stays quiet unless asked.
    let default_level = if args.command.is_some() { LevelFilter::Info } else { LevelFilter::Off };
    SimpleLogger::new()
        .with_level(args.log_level.unwrap_or(default_level))
        .init()?;

    let mut config = Config::load()?;
    if let Some(api) = args.api {
        config.api_base = api;
    }
    log::debug!("using backend {}", config.api_base());
    let client = ApiClient::new(&config)?;

    match args.command {
        Some(command) => commands::run(command, &config, client).await,
        None => {
            cidtui::app::run(&config, Arc::new(client), args.query).await?;
            Ok(())
        }
    }
}
