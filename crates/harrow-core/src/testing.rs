//! In-memory [`ImageRepository`] for tests and dry experiments.
//!
//! Reference filters are matched the way the Docker daemon matches them:
//! an image is returned when any of its tags matches the pattern, where `*`
//! matches any run of characters other than `/`. A returned image carries
//! all of its tags, including tags of other repositories.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::repository::{DeletionEffect, ImageRecord, ImageRepository};

/// Image store backed by a vector of [`ImageRecord`]s.
#[derive(Debug, Default)]
pub struct InMemoryImageRepository {
    state: Mutex<State>,
    failing_lists: HashSet<String>,
    failing_deletes: HashSet<String>,
}

#[derive(Debug, Default)]
struct State {
    images: Vec<(String, ImageRecord)>,
    list_calls: Vec<String>,
    delete_calls: Vec<String>,
}

impl InMemoryImageRepository {
    /// Creates a store holding `images`.
    #[must_use]
    pub fn new(images: impl IntoIterator<Item = ImageRecord>) -> Self {
        let images = images
            .into_iter()
            .enumerate()
            .map(|(i, record)| (format!("sha256:{i:064x}"), record))
            .collect();

        Self {
            state: Mutex::new(State {
                images,
                ..State::default()
            }),
            ..Self::default()
        }
    }

    /// Makes `list_images` fail for exactly this reference.
    #[must_use]
    pub fn fail_list(mut self, reference: impl Into<String>) -> Self {
        self.failing_lists.insert(reference.into());
        self
    }

    /// Makes `delete_image` fail for exactly this tag identity.
    #[must_use]
    pub fn fail_delete(mut self, reference: impl Into<String>) -> Self {
        self.failing_deletes.insert(reference.into());
        self
    }

    /// References passed to `list_images`, in call order.
    #[must_use]
    pub fn list_calls(&self) -> Vec<String> {
        self.state.lock().list_calls.clone()
    }

    /// References passed to `delete_image`, in call order.
    #[must_use]
    pub fn delete_calls(&self) -> Vec<String> {
        self.state.lock().delete_calls.clone()
    }

    /// Tags still present in the store.
    #[must_use]
    pub fn tags(&self) -> BTreeSet<String> {
        self.state
            .lock()
            .images
            .iter()
            .flat_map(|(_, record)| record.repo_tags.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn list_images(&self, reference: &str) -> Result<Vec<ImageRecord>> {
        let mut state = self.state.lock();
        state.list_calls.push(reference.to_string());

        if self.failing_lists.contains(reference) {
            return Err(Error::RuntimeQuery {
                reference: reference.to_string(),
                source: "injected list failure".into(),
            });
        }

        Ok(state
            .images
            .iter()
            .filter(|(_, record)| record.repo_tags.iter().any(|tag| glob_match(reference, tag)))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn delete_image(&self, reference: &str) -> Result<Vec<DeletionEffect>> {
        let mut state = self.state.lock();
        state.delete_calls.push(reference.to_string());

        if self.failing_deletes.contains(reference) {
            return Err(Error::RuntimeDelete {
                reference: reference.to_string(),
                source: "injected delete failure".into(),
            });
        }

        let Some(index) = state
            .images
            .iter()
            .position(|(_, record)| record.repo_tags.iter().any(|tag| tag == reference))
        else {
            return Err(Error::RuntimeDelete {
                reference: reference.to_string(),
                source: format!("No such image: {reference}").into(),
            });
        };

        let (id, record) = &mut state.images[index];
        record.repo_tags.retain(|tag| tag != reference);
        let mut effects = vec![DeletionEffect::Untagged(reference.to_string())];

        if record.repo_tags.is_empty() {
            effects.push(DeletionEffect::Deleted(id.clone()));
            state.images.remove(index);
        }
        Ok(effects)
    }
}

/// Matches `text` against `pattern`, where `*` matches any run of
/// characters except `/`.
#[must_use]
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern = pattern.as_bytes();
    let text = text.as_bytes();

    // matches[j]: pattern[..i] matches text[..j]
    let mut matches = vec![false; text.len() + 1];
    matches[0] = true;

    for &p in pattern {
        let mut next = vec![false; text.len() + 1];
        if p == b'*' {
            next[0] = matches[0];
            for j in 1..=text.len() {
                next[j] = matches[j] || (next[j - 1] && text[j - 1] != b'/');
            }
        } else {
            for j in 1..=text.len() {
                next[j] = matches[j - 1] && text[j - 1] == p;
            }
        }
        matches = next;
    }
    matches[text.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("app:*", "app:v1"));
        assert!(glob_match("app-*:*", "app-a:v1"));
        assert!(glob_match("app:v*", "app:v10"));
        assert!(glob_match("app:v1", "app:v1"));
        assert!(!glob_match("app:v1", "app:v10"));
        assert!(!glob_match("app:*", "other:v1"));
        assert!(!glob_match("*:*", "team/app:v1"));
        assert!(glob_match("team/*:*", "team/app:v1"));
        assert!(glob_match("*", ""));
    }

    #[tokio::test]
    async fn test_list_returns_whole_image() {
        let repo = InMemoryImageRepository::new([ImageRecord::new(["app:v1", "mirror:v1"], 5)]);
        let images = repo.list_images("app:*").await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].repo_tags, vec!["app:v1", "mirror:v1"]);
    }

    #[tokio::test]
    async fn test_delete_untags_then_deletes() {
        let repo = InMemoryImageRepository::new([ImageRecord::new(["app:v1", "app:latest"], 5)]);

        let effects = repo.delete_image("app:v1").await.unwrap();
        assert_eq!(effects, vec![DeletionEffect::Untagged("app:v1".into())]);

        let effects = repo.delete_image("app:latest").await.unwrap();
        assert_eq!(effects.len(), 2);
        assert!(matches!(effects[1], DeletionEffect::Deleted(_)));
        assert!(repo.tags().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_tag_fails() {
        let repo = InMemoryImageRepository::new([]);
        let err = repo.delete_image("app:v1").await.unwrap_err();
        assert!(matches!(err, Error::RuntimeDelete { .. }));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let repo = InMemoryImageRepository::new([ImageRecord::new(["app:v1"], 5)])
            .fail_list("app:*")
            .fail_delete("app:v1");

        assert!(repo.list_images("app:*").await.is_err());
        assert!(repo.delete_image("app:v1").await.is_err());
        assert_eq!(repo.tags().len(), 1);
        assert_eq!(repo.delete_calls(), vec!["app:v1"]);
    }
}
