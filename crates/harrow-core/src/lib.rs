//! # Harrow Core
//!
//! Retention policies for container images, and the engine that applies them.
//!
//! This crate provides:
//!
//! - [`CleanupConfig`] - the JSON configuration document and its validation
//! - [`Policy`] - one validated retention rule
//! - [`age`] - `olderThan` age expressions (`"30 d"`, `"12 h"`, ...)
//! - [`ImageRepository`] - the boundary to a container runtime
//! - [`RetentionEngine`] - decides which tags of a repository to delete, and deletes them
//! - [`PolicyRunner`] - applies the whole policy list, expanding repository patterns
//!
//! ## Example
//!
//! ```rust
//! use harrow_core::{ImageRecord, Policy, PolicyRunner, RetentionEngine};
//! use harrow_core::testing::InMemoryImageRepository;
//!
//! # tokio_test_block(async {
//! let repo = InMemoryImageRepository::new([
//!     ImageRecord::new(["app:v1"], 100),
//!     ImageRecord::new(["app:v2"], 200),
//!     ImageRecord::new(["app:v3"], 300),
//! ]);
//!
//! let policy = Policy::new("app").with_remove_tags(["*"]).with_keep_count(1);
//! let runner = PolicyRunner::new(&repo).with_engine(RetentionEngine::new(&repo).at(1_000));
//! let summary = runner.run(&[policy]).await.unwrap();
//!
//! assert_eq!(summary.deleted, 2);
//! assert_eq!(repo.delete_calls(), vec!["app:v1", "app:v2"]);
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod age;
pub mod config;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod policy;
pub mod repository;
pub mod runner;
pub mod testing;
pub mod validation;

#[cfg(test)]
mod proptest_tests;

// Re-export main types at crate root
pub use config::{CleanupConfig, PolicyEntry};
pub use engine::{RepositoryOutcome, RetentionEngine, Selection};
pub use error::{Error, Result};
pub use policy::{CleanupMode, Policy};
pub use repository::{DeletionEffect, ImageRecord, ImageRepository, TagIdentity};
pub use runner::{PolicyRunner, RunSummary};
pub use validation::ValidationError;

/// Renders a value as indented JSON for verbose diagnostics.
#[must_use]
pub fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}
