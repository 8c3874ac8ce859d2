//! Retention evaluation for a single repository.
//!
//! Given a [`Policy`] bound to a concrete repository, the engine works out
//! which tags to delete and then deletes them:
//!
//! 1. Tags matching `removeTags` are the candidates. No candidates, no work.
//! 2. Tags matching `keepTags` are protected.
//! 3. Candidates created after the `olderThan` cutoff are protected.
//! 4. If fewer than `keepNumber` candidates are protected, the youngest
//!    remaining candidates are spared until the count is met.
//! 5. Everything left is deleted, in ascending identity order.
//!
//! The selection step is the pure function [`select_for_deletion`].

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::inventory::{fetch_tags, TagTimes};
use crate::policy::Policy;
use crate::repository::{DeletionEffect, ImageRepository};

/// Outcome of the selection step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Tags to delete, ascending by identity.
    pub delete: Vec<String>,
    /// Candidates protected by age or by the keep list.
    pub protected: usize,
    /// Candidates spared to satisfy the keep count, in the order they were spared.
    pub spared: Vec<String>,
}

/// Splits remove-candidates into the tags to delete and the tags to keep.
///
/// A candidate is protected when it was created after `cutoff` or when its
/// identity is in `keep`. If fewer than `keep_count` candidates are
/// protected, the most recently created eligible candidates are spared one
/// at a time until the difference is made up or nothing is left. Among
/// candidates with the same creation time, the one with the smallest
/// identity is spared first.
///
/// # Examples
///
/// ```
/// use harrow_core::engine::select_for_deletion;
/// use harrow_core::inventory::TagTimes;
///
/// let remove = TagTimes::from([
///     ("app:v1".to_string(), 100),
///     ("app:v2".to_string(), 200),
///     ("app:v3".to_string(), 300),
/// ]);
/// let selection = select_for_deletion(&remove, &TagTimes::new(), 1_000, 1);
/// assert_eq!(selection.delete, vec!["app:v1", "app:v2"]);
/// assert_eq!(selection.spared, vec!["app:v3"]);
/// ```
#[must_use]
pub fn select_for_deletion(
    remove: &TagTimes,
    keep: &TagTimes,
    cutoff: i64,
    keep_count: usize,
) -> Selection {
    let mut protected = 0usize;
    let mut eligible: Vec<(&str, i64)> = Vec::with_capacity(remove.len());

    for (identity, &created) in remove {
        if created > cutoff || keep.contains_key(identity) {
            protected += 1;
        } else {
            eligible.push((identity.as_str(), created));
        }
    }

    let needed = keep_count.saturating_sub(protected);
    let mut spared = Vec::with_capacity(needed.min(eligible.len()));

    for _ in 0..needed {
        let Some(index) = latest(&eligible) else {
            break;
        };
        spared.push(eligible.remove(index).0.to_string());
    }

    Selection {
        delete: eligible.into_iter().map(|(id, _)| id.to_string()).collect(),
        protected,
        spared,
    }
}

/// Index of the first entry with the greatest creation time.
fn latest(entries: &[(&str, i64)]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (index, &(_, created)) in entries.iter().enumerate() {
        match best {
            Some((_, max)) if created <= max => {}
            _ => best = Some((index, created)),
        }
    }
    best.map(|(index, _)| index)
}

/// Result of applying a policy to one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryOutcome {
    /// The concrete repository.
    pub repository: String,
    /// Tags selected for deletion.
    pub planned: Vec<String>,
    /// Tags actually deleted.
    pub deleted: Vec<String>,
    /// Effects reported by the runtime for the deleted tags.
    pub effects: Vec<DeletionEffect>,
    /// The tag whose deletion failed, after which the rest were abandoned.
    pub stopped_at: Option<String>,
}

/// Applies retention policies through an [`ImageRepository`].
#[derive(Debug)]
pub struct RetentionEngine<'r, R: ?Sized> {
    repo: &'r R,
    now: Option<i64>,
    dry_run: bool,
}

impl<'r, R> RetentionEngine<'r, R>
where
    R: ImageRepository + ?Sized,
{
    /// Creates an engine evaluating against the current time.
    #[must_use]
    pub const fn new(repo: &'r R) -> Self {
        Self {
            repo,
            now: None,
            dry_run: false,
        }
    }

    /// Evaluates age cutoffs against a fixed time (seconds since epoch).
    #[must_use]
    pub const fn at(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }

    /// Computes deletion sets without deleting anything.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns whether deletions are skipped.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Computes which tags of `policy.repository` the policy deletes.
    ///
    /// # Errors
    ///
    /// Propagates runtime query failures.
    pub async fn compute_deletion_set(&self, policy: &Policy) -> Result<Selection> {
        let repository = policy.repository.as_str();

        debug!(repository, patterns = ?policy.remove_tags, "Fetching remove candidates");
        let remove = fetch_tags(self.repo, repository, &policy.remove_tags).await?;
        if remove.is_empty() {
            debug!(repository, "No remove candidates");
            return Ok(Selection::default());
        }

        debug!(repository, patterns = ?policy.keep_tags, "Fetching keep candidates");
        let keep = fetch_tags(self.repo, repository, &policy.keep_tags).await?;

        let now = self.now.unwrap_or_else(|| Utc::now().timestamp());
        let cutoff = policy.older_than.cutoff(now);

        let selection = select_for_deletion(&remove, &keep, cutoff, policy.keep_count);

        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(
                repository,
                cutoff,
                keep_count = policy.keep_count,
                remove = %crate::to_pretty_json(&remove),
                keep = %crate::to_pretty_json(&keep),
                selection = %crate::to_pretty_json(&selection),
                "Computed deletion set"
            );
        }
        Ok(selection)
    }

    /// Computes the deletion set for `policy.repository` and deletes it.
    ///
    /// Deletions run in order. The first failed deletion is logged and ends
    /// the work for this repository; it is reported in
    /// [`RepositoryOutcome::stopped_at`] rather than returned as an error.
    ///
    /// # Errors
    ///
    /// Propagates runtime query failures.
    pub async fn apply(&self, policy: &Policy) -> Result<RepositoryOutcome> {
        let selection = self.compute_deletion_set(policy).await?;
        let mut outcome = RepositoryOutcome {
            repository: policy.repository.clone(),
            planned: selection.delete,
            ..RepositoryOutcome::default()
        };

        if self.dry_run {
            for identity in &outcome.planned {
                info!(tag = %identity, "Would delete");
            }
            return Ok(outcome);
        }

        for identity in &outcome.planned {
            match self.repo.delete_image(identity).await {
                Ok(effects) => {
                    if tracing::enabled!(tracing::Level::DEBUG) {
                        debug!(
                            tag = %identity,
                            effects = %crate::to_pretty_json(&effects),
                            "Deleted image"
                        );
                    }
                    outcome.deleted.push(identity.clone());
                    outcome.effects.extend(effects);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!(
                        repository = %outcome.repository,
                        tag = %identity,
                        error = %e,
                        "Delete failed, skipping remaining tags of repository"
                    );
                    outcome.stopped_at = Some(identity.clone());
                    break;
                }
            }
        }

        info!(
            repository = %outcome.repository,
            planned = outcome.planned.len(),
            deleted = outcome.deleted.len(),
            "Cleaned up repository"
        );
        Ok(outcome)
    }
}
