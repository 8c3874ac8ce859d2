//! Tag inventory queries against an [`ImageRepository`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::Result;
use crate::repository::{ImageRepository, TagIdentity, ALL_TAGS};

/// Mapping from tag identity (`repository:tag`) to creation time.
///
/// Ordered by identity, which fixes the iteration order the retention
/// engine relies on for tie-breaks.
pub type TagTimes = BTreeMap<String, i64>;

/// Fetches every tag of `repository` matching any of `patterns`.
///
/// Each pattern is queried as `repository:pattern`. Results are merged; an
/// identity returned by several queries keeps the last timestamp seen, which
/// is the same image either way. An empty pattern list yields an empty map
/// without querying the runtime.
///
/// # Errors
///
/// Propagates the first runtime query failure.
pub async fn fetch_tags<R>(repo: &R, repository: &str, patterns: &[String]) -> Result<TagTimes>
where
    R: ImageRepository + ?Sized,
{
    let mut tags = TagTimes::new();
    for pattern in patterns {
        let reference = TagIdentity::reference(repository, pattern);
        let images = repo.list_images(&reference).await?;

        for image in images {
            for repo_tag in image.repo_tags {
                debug!(created = image.created, repo_tag = %repo_tag, "Fetched image tag");
                tags.insert(repo_tag, image.created);
            }
        }
    }
    Ok(tags)
}

/// Resolves a repository pattern to the concrete repositories present.
///
/// Queries `pattern:*` and collects the distinct repository part of every
/// returned tag identity. No match is not an error: the set is empty.
///
/// # Errors
///
/// Propagates a runtime query failure.
pub async fn expand_repositories<R>(repo: &R, pattern: &str) -> Result<BTreeSet<String>>
where
    R: ImageRepository + ?Sized,
{
    let tags = fetch_tags(repo, pattern, &[ALL_TAGS.to_string()]).await?;

    let repositories: BTreeSet<String> = tags
        .keys()
        .filter_map(|identity| TagIdentity::parse(identity))
        .map(|identity| identity.repository.to_string())
        .collect();

    if tracing::enabled!(tracing::Level::DEBUG) {
        debug!(
            pattern,
            repositories = %crate::to_pretty_json(&repositories),
            "Expanded repository pattern"
        );
    }
    Ok(repositories)
}
