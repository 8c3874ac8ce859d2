//! Error types for Docker Engine operations.

use thiserror::Error;

/// Errors that can occur while talking to the Docker Engine.
#[derive(Debug, Error)]
pub enum DockerError {
    /// Failed to set up a connection to the engine.
    #[error("Failed to connect to Docker at {host}: {source}")]
    ConnectionFailed {
        /// Engine address.
        host: String,
        /// Underlying error.
        #[source]
        source: bollard::errors::Error,
    },

    /// The engine did not answer a ping.
    #[error("Docker at {host} is not responding: {source}")]
    PingFailed {
        /// Engine address.
        host: String,
        /// Underlying error.
        #[source]
        source: bollard::errors::Error,
    },

    /// Listing images failed.
    #[error("Image list request for '{reference}' failed: {source}")]
    ListFailed {
        /// Reference filter that was sent.
        reference: String,
        /// Underlying error.
        #[source]
        source: bollard::errors::Error,
    },

    /// Removing an image failed.
    #[error("Image remove request for '{reference}' failed: {source}")]
    RemoveFailed {
        /// Tag identity that was sent.
        reference: String,
        /// Underlying error.
        #[source]
        source: bollard::errors::Error,
    },

    /// The engine address uses a scheme this client cannot speak.
    #[error("Unsupported Docker host '{host}': expected unix:// or tcp://")]
    UnsupportedHost {
        /// Engine address.
        host: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unsupported_host() {
        let err = DockerError::UnsupportedHost {
            host: "ssh://me@box".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported Docker host 'ssh://me@box': expected unix:// or tcp://"
        );
    }

    #[test]
    fn test_error_display_remove_failed() {
        let err = DockerError::RemoveFailed {
            reference: "app:v1".to_string(),
            source: bollard::errors::Error::DockerResponseServerError {
                status_code: 409,
                message: "image is being used by running container".to_string(),
            },
        };
        let message = err.to_string();
        assert!(message.contains("app:v1"));
        assert!(message.contains("running container"));
    }
}
