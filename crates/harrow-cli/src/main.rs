//! Harrow CLI - prunes old container image tags according to retention policies.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_from(commands::normalize_args(std::env::args_os()));

    let default_filter = if cli.verbose {
        "harrow=debug"
    } else {
        "harrow=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Some(Commands::Validate) => commands::validate::run(&cli.config).map(|_| ()),
        Some(Commands::Version) => {
            println!("harrow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => {
            info!(config = %cli.config.display(), dry_run = cli.dry_run, "Starting");
            match commands::run::execute(&cli).await {
                Ok(summary) => {
                    info!(
                        policies = summary.policies,
                        repositories = summary.repositories,
                        planned = summary.planned,
                        deleted = summary.deleted,
                        stopped = summary.stopped.len(),
                        "Finished"
                    );
                    Ok(())
                }
                Err(e) => {
                    error!(error = %format!("{e:#}"), "Cleanup aborted");
                    Err(e)
                }
            }
        }
    }
}
