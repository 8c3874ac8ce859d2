//! # Harrow Docker
//!
//! Docker Engine backend for Harrow retention policies.
//!
//! This crate provides [`DockerImageRepository`], an implementation of
//! [`harrow_core::ImageRepository`] that lists images with the engine's
//! `reference` filter and removes tags without forcing or pruning overrides.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use harrow_core::{Policy, PolicyRunner};
//! use harrow_docker::{DockerConfig, DockerImageRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DockerConfig::new().with_host("unix:///var/run/docker.sock");
//!     let repo = DockerImageRepository::connect(&config).await?;
//!
//!     let policy = Policy::new("app").with_remove_tags(["*"]).with_keep_count(3);
//!     let summary = PolicyRunner::new(&repo).run(&[policy]).await?;
//!     println!("deleted {} tags", summary.deleted);
//!
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod config;
mod error;

pub use client::DockerImageRepository;
pub use config::{DockerConfig, DockerHost, DEFAULT_TIMEOUT};
pub use error::DockerError;
