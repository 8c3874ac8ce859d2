//! Error types for Harrow core operations.
//!
//! This module defines the error types used throughout the `harrow-core` crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by [`ImageRepository`](crate::ImageRepository) implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while loading policies or applying them.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be read.
    #[error("Failed to read config from {path}: {source}")]
    ConfigLoad {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for the expected schema.
    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A configured value is invalid.
    #[error("Invalid configuration: {0}")]
    ConfigValidation(#[from] ValidationError),

    /// Listing images from the runtime failed.
    #[error("Failed to list images matching '{reference}': {source}")]
    RuntimeQuery {
        /// Reference pattern that was queried.
        reference: String,
        /// Underlying runtime error.
        #[source]
        source: BoxError,
    },

    /// Deleting an image from the runtime failed.
    #[error("Failed to delete image '{reference}': {source}")]
    RuntimeDelete {
        /// Tag identity that was being deleted.
        reference: String,
        /// Underlying runtime error.
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Returns `false` for errors the runner recovers from locally.
    ///
    /// Only a failed delete is recovered from: the remaining deletions for
    /// that repository are abandoned and the run continues.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::RuntimeDelete { .. })
    }
}
