//! Docker Engine client implementing [`ImageRepository`].

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::image::{ListImagesOptions, RemoveImageOptions};
use bollard::models::ImageDeleteResponseItem;
use bollard::{Docker, API_DEFAULT_VERSION};
use harrow_core::{DeletionEffect, Error, ImageRecord, ImageRepository, Result};
use tracing::{debug, info};

use crate::config::{DockerConfig, DockerHost};
use crate::error::DockerError;

/// Image repository backed by a Docker Engine.
#[derive(Debug, Clone)]
pub struct DockerImageRepository {
    docker: Docker,
    host: String,
}

impl DockerImageRepository {
    /// Connects to the engine, negotiates the API version and pings it.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is unsupported, the client cannot be
    /// created, or the engine does not answer.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use harrow_docker::{DockerConfig, DockerImageRepository};
    ///
    /// # async fn example() -> Result<(), harrow_docker::DockerError> {
    /// let repo = DockerImageRepository::connect(&DockerConfig::new()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: &DockerConfig) -> std::result::Result<Self, DockerError> {
        let host = config
            .host
            .clone()
            .unwrap_or_else(|| "local defaults".to_string());
        let timeout = config.timeout.as_secs();

        let docker = match config.endpoint()? {
            DockerHost::LocalDefaults => Docker::connect_with_local_defaults(),
            #[cfg(unix)]
            DockerHost::Unix(path) => Docker::connect_with_unix(&path, timeout, API_DEFAULT_VERSION),
            #[cfg(not(unix))]
            DockerHost::Unix(_) => {
                return Err(DockerError::UnsupportedHost { host });
            }
            DockerHost::Http(addr) => Docker::connect_with_http(&addr, timeout, API_DEFAULT_VERSION),
        }
        .map_err(|source| DockerError::ConnectionFailed {
            host: host.clone(),
            source,
        })?
        .with_timeout(config.timeout);

        let docker = docker
            .negotiate_version()
            .await
            .map_err(|source| DockerError::ConnectionFailed {
                host: host.clone(),
                source,
            })?;

        docker
            .ping()
            .await
            .map_err(|source| DockerError::PingFailed {
                host: host.clone(),
                source,
            })?;

        info!(host = %host, "Connected to Docker");
        Ok(Self { docker, host })
    }

    /// Returns the engine address this client was created for.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl ImageRepository for DockerImageRepository {
    async fn list_images(&self, reference: &str) -> Result<Vec<ImageRecord>> {
        let options = ListImagesOptions::<String> {
            all: false,
            filters: HashMap::from([("reference".to_string(), vec![reference.to_string()])]),
            ..Default::default()
        };

        let summaries = self
            .docker
            .list_images(Some(options))
            .await
            .map_err(|source| Error::RuntimeQuery {
                reference: reference.to_string(),
                source: Box::new(DockerError::ListFailed {
                    reference: reference.to_string(),
                    source,
                }),
            })?;

        debug!(reference, images = summaries.len(), "Listed images");
        Ok(summaries
            .into_iter()
            .map(|summary| ImageRecord::new(summary.repo_tags, summary.created))
            .collect())
    }

    async fn delete_image(&self, reference: &str) -> Result<Vec<DeletionEffect>> {
        let options = RemoveImageOptions {
            force: false,
            noprune: false,
        };

        let items = self
            .docker
            .remove_image(reference, Some(options), None)
            .await
            .map_err(|source| Error::RuntimeDelete {
                reference: reference.to_string(),
                source: Box::new(DockerError::RemoveFailed {
                    reference: reference.to_string(),
                    source,
                }),
            })?;

        Ok(deletion_effects(items))
    }
}

/// Flattens the engine's delete response into per-reference effects.
fn deletion_effects(items: Vec<ImageDeleteResponseItem>) -> Vec<DeletionEffect> {
    let mut effects = Vec::with_capacity(items.len());
    for item in items {
        if let Some(untagged) = item.untagged {
            effects.push(DeletionEffect::Untagged(untagged));
        }
        if let Some(deleted) = item.deleted {
            effects.push(DeletionEffect::Deleted(deleted));
        }
    }
    effects
}
