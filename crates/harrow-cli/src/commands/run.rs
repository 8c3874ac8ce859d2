//! Cleanup command implementation.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use harrow_core::{to_pretty_json, CleanupConfig, Policy, PolicyRunner, RetentionEngine, RunSummary};
use harrow_docker::{DockerConfig, DockerImageRepository};
use tracing::{debug, Level};

use super::Cli;

/// Loads and validates the configuration, then applies it to Docker.
///
/// Docker is contacted only after every policy has validated.
pub async fn execute(cli: &Cli) -> Result<RunSummary> {
    let policies = load_policies(&cli.config)?;

    let mut docker = DockerConfig::new().with_timeout(Duration::from_secs(cli.timeout));
    if let Some(host) = &cli.docker_host {
        docker = docker.with_host(host.as_str());
    }
    let repo = DockerImageRepository::connect(&docker)
        .await
        .context("Failed to reach the Docker daemon")?;

    let engine = RetentionEngine::new(&repo).dry_run(cli.dry_run);
    let summary = PolicyRunner::new(&repo)
        .with_engine(engine)
        .run(&policies)
        .await?;

    if tracing::enabled!(Level::DEBUG) {
        debug!(summary = %to_pretty_json(&summary), "Run summary");
    }
    Ok(summary)
}

/// Reads the configuration file and turns every entry into a [`Policy`].
pub fn load_policies(path: &Path) -> Result<Vec<Policy>> {
    let config = CleanupConfig::from_file(path)?;
    if tracing::enabled!(Level::DEBUG) {
        debug!(config = %to_pretty_json(&config), "Loaded configuration");
    }
    Ok(config.validate()?)
}
