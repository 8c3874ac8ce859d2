//! Retention policy model.
//!
//! A [`Policy`] is the validated form of one entry in the configuration's
//! `images` list. It is immutable for the duration of a run.

use std::fmt;

use serde::Serialize;

use crate::age::OlderThan;
use crate::validation::ValidationError;

/// How a policy's `repository` pattern is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupMode {
    /// The pattern names a single repository; the policy is evaluated once.
    #[default]
    Together,
    /// The pattern is expanded to every matching repository present in the
    /// runtime, and the policy is evaluated for each one independently.
    Separately,
}

impl CleanupMode {
    /// Parses a configured `type` value.
    ///
    /// The empty string selects [`CleanupMode::Together`]; matching is
    /// case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns a constraint error for any other value.
    ///
    /// # Examples
    ///
    /// ```
    /// use harrow_core::CleanupMode;
    ///
    /// assert_eq!(CleanupMode::parse("").unwrap(), CleanupMode::Together);
    /// assert_eq!(CleanupMode::parse("Separately").unwrap(), CleanupMode::Separately);
    /// assert!(CleanupMode::parse("foo").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.is_empty() || input.eq_ignore_ascii_case("together") {
            Ok(Self::Together)
        } else if input.eq_ignore_ascii_case("separately") {
            Ok(Self::Separately)
        } else {
            Err(ValidationError::constraint(
                "type",
                format!("cleanup type must be 'separately' or 'together', got '{input}'"),
            ))
        }
    }

    /// Returns the configuration spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Together => "together",
            Self::Separately => "separately",
        }
    }
}

impl fmt::Display for CleanupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated retention policy.
///
/// # Examples
///
/// ```
/// use harrow_core::{CleanupMode, Policy};
/// use harrow_core::age::OlderThan;
///
/// let policy = Policy::new("app")
///     .with_remove_tags(["*"])
///     .with_keep_tags(["stable"])
///     .with_keep_count(3)
///     .with_older_than(OlderThan::parse("7 d").unwrap());
///
/// assert_eq!(policy.mode, CleanupMode::Together);
/// assert_eq!(policy.keep_count, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Whether the repository pattern is expanded.
    #[serde(rename = "type")]
    pub mode: CleanupMode,

    /// Repository name, or a repository pattern under [`CleanupMode::Separately`].
    pub repository: String,

    /// Minimum number of tags to retain beyond those protected by age or keep list.
    #[serde(rename = "keepNumber")]
    pub keep_count: usize,

    /// Tag patterns that are never deleted.
    pub keep_tags: Vec<String>,

    /// Tag patterns that form the deletion candidates. `*` selects every tag.
    pub remove_tags: Vec<String>,

    /// Minimum age an image must reach before it may be deleted.
    pub older_than: OlderThan,
}

impl Policy {
    /// Creates a policy for `repository` with no candidates and no protection.
    #[must_use]
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            mode: CleanupMode::Together,
            repository: repository.into(),
            keep_count: 0,
            keep_tags: Vec::new(),
            remove_tags: Vec::new(),
            older_than: OlderThan::Now,
        }
    }

    /// Sets the cleanup mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: CleanupMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the keep count.
    #[must_use]
    pub const fn with_keep_count(mut self, keep_count: usize) -> Self {
        self.keep_count = keep_count;
        self
    }

    /// Sets the keep tag patterns.
    #[must_use]
    pub fn with_keep_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the remove tag patterns.
    #[must_use]
    pub fn with_remove_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remove_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the age threshold.
    #[must_use]
    pub const fn with_older_than(mut self, older_than: OlderThan) -> Self {
        self.older_than = older_than;
        self
    }

    /// Returns a copy of this policy bound to a concrete repository.
    ///
    /// Used when a [`CleanupMode::Separately`] pattern is expanded.
    #[must_use]
    pub fn for_repository(&self, repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            ..self.clone()
        }
    }
}
