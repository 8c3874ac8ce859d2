//! Container runtime boundary.
//!
//! The retention engine never talks to a runtime directly. It works through
//! the [`ImageRepository`] trait, which lists images matching a reference
//! pattern and deletes images by tag identity. Pattern matching semantics
//! (a `*` in the tag position matching every tag) belong to the runtime.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// Tag wildcard selecting every tag of a repository.
pub const ALL_TAGS: &str = "*";

/// One image as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    /// Every `repository:tag` pointing at this image.
    pub repo_tags: Vec<String>,
    /// Creation time, seconds since the Unix epoch.
    pub created: i64,
}

impl ImageRecord {
    /// Creates a record.
    #[must_use]
    pub fn new<I, S>(repo_tags: I, created: i64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            repo_tags: repo_tags.into_iter().map(Into::into).collect(),
            created,
        }
    }
}

/// Effect reported by the runtime for a single delete call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionEffect {
    /// A tag reference was removed from an image that is still present.
    Untagged(String),
    /// An image layer or image ID was deleted.
    Deleted(String),
}

/// Access to a container runtime's image store.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Lists images matching `reference` (e.g. `app:*` or `app-*:v1`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuntimeQuery`](crate::Error::RuntimeQuery) when the
    /// runtime cannot be queried.
    async fn list_images(&self, reference: &str) -> Result<Vec<ImageRecord>>;

    /// Deletes the image tag `reference` (a `repository:tag` identity).
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuntimeDelete`](crate::Error::RuntimeDelete) when the
    /// runtime refuses or fails the deletion.
    async fn delete_image(&self, reference: &str) -> Result<Vec<DeletionEffect>>;
}

/// A `repository:tag` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagIdentity<'a> {
    /// Repository part, possibly including a registry host and port.
    pub repository: &'a str,
    /// Tag part.
    pub tag: &'a str,
}

impl<'a> TagIdentity<'a> {
    /// Splits a tag identity on its last `:` following the last `/`.
    ///
    /// Returns `None` when there is no tag separator.
    ///
    /// # Examples
    ///
    /// ```
    /// use harrow_core::TagIdentity;
    ///
    /// let id = TagIdentity::parse("localhost:5000/app:v1").unwrap();
    /// assert_eq!(id.repository, "localhost:5000/app");
    /// assert_eq!(id.tag, "v1");
    ///
    /// assert!(TagIdentity::parse("localhost:5000/app").is_none());
    /// ```
    #[must_use]
    pub fn parse(identity: &'a str) -> Option<Self> {
        let name_start = identity.rfind('/').map_or(0, |i| i + 1);
        let colon = identity[name_start..].rfind(':')? + name_start;
        Some(Self {
            repository: &identity[..colon],
            tag: &identity[colon + 1..],
        })
    }

    /// Builds the reference string `repository:tag`.
    #[must_use]
    pub fn reference(repository: &str, tag: &str) -> String {
        format!("{repository}:{tag}")
    }
}

impl fmt::Display for TagIdentity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let id = TagIdentity::parse("app:v1").unwrap();
        assert_eq!(id.repository, "app");
        assert_eq!(id.tag, "v1");
        assert_eq!(id.to_string(), "app:v1");
    }

    #[test]
    fn test_parse_with_namespace_and_port() {
        let id = TagIdentity::parse("registry.local:5000/team/app:1.2.3").unwrap();
        assert_eq!(id.repository, "registry.local:5000/team/app");
        assert_eq!(id.tag, "1.2.3");
    }

    #[test]
    fn test_parse_without_tag() {
        assert!(TagIdentity::parse("app").is_none());
        assert!(TagIdentity::parse("host:5000/app").is_none());
    }

    #[test]
    fn test_reference() {
        assert_eq!(TagIdentity::reference("app", ALL_TAGS), "app:*");
    }

    #[test]
    fn test_effect_serialization() {
        let json = serde_json::to_string(&DeletionEffect::Untagged("app:v1".into())).unwrap();
        assert_eq!(json, r#"{"untagged":"app:v1"}"#);
    }
}
