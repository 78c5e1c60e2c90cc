use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use beatsaber_presence::settings::{default_settings_path, load_settings};
use beatsaber_presence::{logging, PresenceService, Settings};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to settings.json (defaults to the platform config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings_path = cli.settings.map(Ok).unwrap_or_else(default_settings_path);
    let (settings, settings_error) = match settings_path {
        Ok(path) => match load_settings(&path) {
            Ok(settings) => (settings, None),
            Err(e) => (Settings::default(), Some(e.to_string())),
        },
        Err(e) => (Settings::default(), Some(e.to_string())),
    };

    let _guard = logging::init_logging(cli.log_dir, settings.log_retention_days);
    if let Some(e) = settings_error {
        tracing::warn!("Using default settings: {}", e);
    }

    let mut service = PresenceService::start(&settings)
        .await
        .context("failed to start presence service")?;

    service
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    service.shutdown().await;
    Ok(())
}
