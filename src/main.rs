use anyhow::Context as AnyhowContext;
use clap::Parser;
use serenity::{Client, model::prelude::*};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod config;
mod constant;
mod handler;
mod picker;
mod poster;
mod scheduler;

use config::Configuration;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the bot configuration file.
    #[arg(short, long, default_value = constant::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = Configuration::load(&args.config)?;

    let interval = scheduler::parse_interval(&config.posting.interval)
        .context("Expected posting.interval to be a valid duration")?;

    let mut client = Client::builder(
        config
            .authentication
            .discord_token
            .as_deref()
            .context("Expected authentication.discord_token to be filled in config")?,
        GatewayIntents::default(),
    )
    .event_handler(handler::Handler::new(config.clone()))
    .await
    .context("Error creating client")?;

    let application_id = config
        .authentication
        .application_id
        .context("Expected authentication.application_id to be filled in config")?;
    client.http.set_application_id(ApplicationId::new(application_id));

    let http = client.http.clone();
    tokio::spawn(async move {
        if let Err(why) = client.start().await {
            error!("Client error: {why:?}");
            std::process::exit(1);
        }
    });

    poster::run(http, config, interval).await
}
