//! Configuration types for the Docker client.

use std::time::Duration;

use crate::error::DockerError;

/// Default request timeout, matching the Docker CLI.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for connecting to a Docker Engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerConfig {
    /// Engine address (`unix:///var/run/docker.sock`, `tcp://host:2375`).
    ///
    /// `None` uses the platform defaults, honouring `DOCKER_HOST`.
    pub host: Option<String>,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerConfig {
    /// Creates a configuration that connects with the platform defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use harrow_docker::DockerConfig;
    ///
    /// let config = DockerConfig::new();
    /// assert!(config.host.is_none());
    /// assert_eq!(config.timeout.as_secs(), 120);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            host: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the engine address. An empty string keeps the platform defaults.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into();
        self.host = if host.is_empty() { None } else { Some(host) };
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves the configured address into a transport.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::UnsupportedHost`] for schemes other than
    /// `unix://`, `tcp://` and `http://`.
    ///
    /// # Examples
    ///
    /// ```
    /// use harrow_docker::{DockerConfig, DockerHost};
    ///
    /// let config = DockerConfig::new().with_host("tcp://10.0.0.5:2375");
    /// assert_eq!(
    ///     config.endpoint().unwrap(),
    ///     DockerHost::Http("http://10.0.0.5:2375".to_string())
    /// );
    /// ```
    pub fn endpoint(&self) -> Result<DockerHost, DockerError> {
        let Some(host) = self.host.as_deref() else {
            return Ok(DockerHost::LocalDefaults);
        };

        if let Some(path) = host.strip_prefix("unix://") {
            if !path.is_empty() {
                return Ok(DockerHost::Unix(path.to_string()));
            }
        } else if let Some(addr) = host
            .strip_prefix("tcp://")
            .or_else(|| host.strip_prefix("http://"))
        {
            if !addr.is_empty() {
                return Ok(DockerHost::Http(format!("http://{addr}")));
            }
        }

        Err(DockerError::UnsupportedHost {
            host: host.to_string(),
        })
    }
}

/// Transport used to reach the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerHost {
    /// Platform defaults (`DOCKER_HOST`, else the local socket).
    LocalDefaults,
    /// Unix domain socket at the given path.
    Unix(String),
    /// Plain HTTP to the given `http://host:port` address.
    Http(String),
}
