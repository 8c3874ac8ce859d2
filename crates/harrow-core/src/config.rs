//! Cleanup configuration file.
//!
//! The configuration is a JSON document with a single `images` list:
//!
//! ```json
//! { "images": [
//!   { "type": "separately",
//!     "repository": "ci/app-*",
//!     "keepNumber": 5,
//!     "keepTags": ["latest"],
//!     "removeTags": ["*"],
//!     "olderThan": "2 w" }
//! ] }
//! ```
//!
//! Loading and validation are separate steps. [`CleanupConfig::from_file`]
//! only fails on I/O or JSON errors; [`CleanupConfig::validate`] turns every
//! entry into a typed [`Policy`] and fails on the first invalid value, before
//! the container runtime is contacted.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::age::OlderThan;
use crate::error::{Error, Result};
use crate::policy::{CleanupMode, Policy};
use crate::validation::ValidationError;

/// The configuration document as written on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Policy entries, applied in order.
    #[serde(default)]
    pub images: Vec<PolicyEntry>,
}

/// One raw entry of the `images` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyEntry {
    /// `"together"`, `"separately"` or empty.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,

    /// Repository name or pattern.
    #[serde(default, deserialize_with = "null_as_default")]
    pub repository: String,

    /// Number of tags to keep.
    #[serde(default, deserialize_with = "null_as_default")]
    pub keep_number: i64,

    /// Tag patterns to protect.
    #[serde(default)]
    pub keep_tags: Option<Vec<String>>,

    /// Tag patterns to consider for deletion.
    #[serde(default)]
    pub remove_tags: Option<Vec<String>>,

    /// Age expression, e.g. `"30 d"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub older_than: String,
}

impl PolicyEntry {
    /// Validates this entry and converts it into a [`Policy`].
    ///
    /// # Errors
    ///
    /// Returns the first invalid field: an unknown `type`, an empty
    /// `repository`, a negative `keepNumber` or a malformed `olderThan`.
    pub fn to_policy(&self) -> std::result::Result<Policy, ValidationError> {
        let mode = CleanupMode::parse(&self.kind)?;

        if self.repository.is_empty() {
            return Err(ValidationError::required("repository"));
        }

        let keep_count = usize::try_from(self.keep_number).map_err(|_| {
            ValidationError::range(
                "keepNumber",
                format!("keepNumber must be >= 0, got {}", self.keep_number),
            )
        })?;

        let older_than = OlderThan::parse(&self.older_than)?;

        Ok(Policy {
            mode,
            repository: self.repository.clone(),
            keep_count,
            keep_tags: self.keep_tags.clone().unwrap_or_default(),
            remove_tags: self.remove_tags.clone().unwrap_or_default(),
            older_than,
        })
    }
}

impl CleanupConfig {
    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigLoad`] if the file cannot be read and
    /// [`Error::ConfigParse`] if it is not valid JSON for this schema.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::ConfigLoad {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_slice(&bytes).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates every entry, returning the typed policies in file order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] for the first invalid entry; the
    /// field path names the entry index, e.g. `images[1].type`.
    ///
    /// # Examples
    ///
    /// ```
    /// use harrow_core::CleanupConfig;
    ///
    /// let config: CleanupConfig = serde_json::from_str(
    ///     r#"{ "images": [ { "repository": "app", "removeTags": ["*"] } ] }"#,
    /// ).unwrap();
    /// let policies = config.validate().unwrap();
    /// assert_eq!(policies[0].repository, "app");
    /// ```
    pub fn validate(&self) -> Result<Vec<Policy>> {
        self.images
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                entry
                    .to_policy()
                    .map_err(|e| Error::ConfigValidation(e.nested(&format!("images[{index}]"))))
            })
            .collect()
    }
}

/// Reads JSON `null` as the field's default, the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
