//! Applies the full policy list.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::CleanupConfig;
use crate::engine::{RepositoryOutcome, RetentionEngine};
use crate::error::Result;
use crate::inventory::expand_repositories;
use crate::policy::{CleanupMode, Policy};
use crate::repository::ImageRepository;

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Policies processed.
    pub policies: usize,
    /// Concrete repositories evaluated.
    pub repositories: usize,
    /// Tags selected for deletion.
    pub planned: usize,
    /// Tags deleted.
    pub deleted: usize,
    /// Repositories whose deletions stopped at a failed delete.
    pub stopped: Vec<String>,
}

impl RunSummary {
    fn record(&mut self, outcome: &RepositoryOutcome) {
        self.repositories += 1;
        self.planned += outcome.planned.len();
        self.deleted += outcome.deleted.len();
        if outcome.stopped_at.is_some() {
            self.stopped.push(outcome.repository.clone());
        }
    }
}

/// Runs policies in order through a [`RetentionEngine`].
#[derive(Debug)]
pub struct PolicyRunner<'r, R: ?Sized> {
    engine: RetentionEngine<'r, R>,
    repo: &'r R,
}

impl<'r, R> PolicyRunner<'r, R>
where
    R: ImageRepository + ?Sized,
{
    /// Creates a runner with a default engine over `repo`.
    #[must_use]
    pub const fn new(repo: &'r R) -> Self {
        Self {
            engine: RetentionEngine::new(repo),
            repo,
        }
    }

    /// Replaces the engine, e.g. to fix the evaluation time or enable dry-run.
    #[must_use]
    pub fn with_engine(mut self, engine: RetentionEngine<'r, R>) -> Self {
        self.engine = engine;
        self
    }

    /// Validates `config` and runs every policy in it.
    ///
    /// Validation covers all entries before the runtime is contacted, so an
    /// invalid entry anywhere in the file aborts with no side effects.
    ///
    /// # Errors
    ///
    /// Returns the validation error, or the first runtime query failure.
    pub async fn run_config(&self, config: &CleanupConfig) -> Result<RunSummary> {
        let policies = config.validate()?;
        self.run(&policies).await
    }

    /// Runs `policies` in order.
    ///
    /// # Errors
    ///
    /// Stops at the first runtime query failure. Policies already processed
    /// keep their effects.
    pub async fn run(&self, policies: &[Policy]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for policy in policies {
            self.run_policy(policy, &mut summary).await?;
            summary.policies += 1;
        }
        Ok(summary)
    }

    async fn run_policy(&self, policy: &Policy, summary: &mut RunSummary) -> Result<()> {
        info!(
            repository = %policy.repository,
            mode = %policy.mode,
            "Applying policy"
        );

        match policy.mode {
            CleanupMode::Together => {
                let outcome = self.engine.apply(policy).await?;
                summary.record(&outcome);
            }
            CleanupMode::Separately => {
                let repositories = expand_repositories(self.repo, &policy.repository).await?;
                if repositories.is_empty() {
                    debug!(pattern = %policy.repository, "No repositories match pattern");
                }
                for repository in repositories {
                    let outcome = self.engine.apply(&policy.for_repository(repository)).await?;
                    summary.record(&outcome);
                }
            }
        }
        Ok(())
    }
}
