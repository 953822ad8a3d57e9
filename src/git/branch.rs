use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::http::{HttpError, HttpFetcher};

use super::{Coordinate, GitError, RefLister};

const HASH_PREFIX_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum BranchError {
    #[error("error fetching commit hash for branch {branch}: {source}")]
    ListRefs { branch: String, source: GitError },
    #[error("no commit found for branch {branch}")]
    NoCommit { branch: String },
    #[error("failed to fetch commit info: {0}")]
    Http(#[from] HttpError),
    #[error("GitHub API returned status: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode GitHub API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("commit hash {0} is too short for a pseudo-version")]
    ShortHash(String),
    #[error(transparent)]
    Repository(GitError),
}

/// Subset of the GitHub `GET /repos/{owner}/{repo}/commits/{ref}` response.
#[derive(Debug, Deserialize)]
struct CommitResponse {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Signature,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: DateTime<Utc>,
}

/// Turns a branch of a GitHub repository into the Go pseudo-version of its head,
/// `v0.0.0-<yyyymmddhhmmss>-<12 hex>`.
pub struct BranchResolver<L, H> {
    refs: L,
    http: H,
    api_url: String,
}

impl<L: RefLister, H: HttpFetcher> BranchResolver<L, H> {
    pub fn new(refs: L, http: H, api_url: impl Into<String>) -> Self {
        BranchResolver {
            refs,
            http,
            api_url: api_url.into(),
        }
    }

    pub fn pseudo_version(&self, repository: &str, branch: &str) -> Result<String, BranchError> {
        let coordinate = Coordinate::parse(repository).map_err(BranchError::Repository)?;

        let commit_hash = self.head_commit(&coordinate, branch)?;
        debug!("Branch {} of {} is at {}", branch, coordinate, commit_hash);

        let committed_at = self.commit_date(&coordinate, &commit_hash)?;
        let version = pseudo_version(&committed_at, &commit_hash)?;
        info!("Resolved {}@{} to {}", coordinate, branch, version);

        Ok(version)
    }

    fn head_commit(&self, coordinate: &Coordinate, branch: &str) -> Result<String, BranchError> {
        let refs = self
            .refs
            .list_refs(&coordinate.to_git_url(), branch)
            .map_err(|source| BranchError::ListRefs {
                branch: branch.to_string(),
                source,
            })?;

        refs.into_iter()
            .next()
            .map(|remote_ref| remote_ref.commit_hash)
            .ok_or_else(|| BranchError::NoCommit {
                branch: branch.to_string(),
            })
    }

    fn commit_date(
        &self,
        coordinate: &Coordinate,
        commit_hash: &str,
    ) -> Result<DateTime<Utc>, BranchError> {
        let url = format!(
            "{}/repos/{}/commits/{}",
            self.api_url.trim_end_matches('/'),
            coordinate.api_path(),
            commit_hash
        );
        debug!("Fetching commit metadata from {}", url);

        let response = self.http.get(&url)?;
        if !response.is_ok() {
            return Err(BranchError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let commit: CommitResponse = serde_json::from_str(&response.body)?;
        Ok(commit.commit.committer.date)
    }
}

pub fn pseudo_version(committed_at: &DateTime<Utc>, commit_hash: &str) -> Result<String, BranchError> {
    let prefix = commit_hash
        .get(..HASH_PREFIX_LEN)
        .ok_or_else(|| BranchError::ShortHash(commit_hash.to_string()))?;
    Ok(format!(
        "v0.0.0-{}-{}",
        committed_at.format("%Y%m%d%H%M%S"),
        prefix
    ))
}
