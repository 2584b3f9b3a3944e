use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use janitor_core::{
    load_config, run_cleanup, run_force_seed, validate_config, QBittorrentClient, RunLog,
};

#[derive(Parser)]
#[command(name = "qbit-janitor", version, about = "Retention policy engine for a qBittorrent fleet")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Dry run: log every decision, perform no deletions
    #[arg(long = "test")]
    test: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Remove torrents that have earned removal (the default)
    Cleanup,
    /// Force-start torrents in the configured categories
    ForceSeed,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A failed run is logged, never surfaced as a non-zero exit, so a
    // scheduler keeps invoking the next run.
    if let Err(e) = run(cli).await {
        // No subscriber is installed yet when config loading failed.
        let _ = tracing_subscriber::fmt().try_init();
        error!("Run aborted: {:#}", e);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    let default_filter = if config.logging.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Loaded configuration from {:?}", cli.config);
    if cli.test {
        info!("Test mode enabled, no torrents will be removed");
    }

    let client = QBittorrentClient::new(config.login.clone())
        .context("Failed to build qBittorrent client")?;
    let mut log = RunLog::open(&config.data_dir());

    match cli.command.unwrap_or(Command::Cleanup) {
        Command::Cleanup => {
            let summary = run_cleanup(&client, &config, cli.test, &mut log).await?;
            info!(
                "Cleanup finished: {} eligible, {} removed, {:.2} GB freed",
                summary.eligible_count,
                summary.report.removed_count(),
                summary.space_freed_gb,
            );
        }
        Command::ForceSeed => {
            let summary = run_force_seed(&client, &config, cli.test, &mut log).await?;
            info!("Force-seed finished: {} torrents", summary.hashes.len());
        }
    }

    Ok(())
}
