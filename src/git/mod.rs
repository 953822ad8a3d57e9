use std::fmt::Display;

use git2::{Config, Cred, CredentialType, Direction, Remote, RemoteCallbacks};
use log::{debug, trace};
use regex_lite::Regex;
use thiserror::Error;

pub mod branch;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git error while listing refs of {url}: {source}")]
    ListRefs { url: String, source: git2::Error },
    #[error("Invalid repository pattern: {0}")]
    Regex(#[from] regex_lite::Error),
    #[error("Missing url component `{0}` in repository `{1}`")]
    MissingUrlComponent(String, String),
}

/// A repository named the way Go module paths spell it: the forge host followed
/// by the path on that forge, e.g. `github.com/openshift/api`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub forge: String,
    pub path: String,
}

impl Coordinate {
    /// Parses `forge/path`. The path keeps every remaining segment, so nested
    /// groups like `gitlab.com/group/sub/repo` are accepted.
    pub fn parse(repository: &str) -> Result<Coordinate, GitError> {
        let re = Regex::new(r"^(?P<forge>[^/]+)/(?P<path>[^/].*?)(?:\.git)?/?$")?;
        let captures = re.captures(repository);
        let captures = captures.as_ref();

        let component = |name: &str| {
            captures
                .and_then(|c| c.name(name))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| {
                    GitError::MissingUrlComponent(name.to_string(), repository.to_string())
                })
        };

        Ok(Coordinate {
            forge: component("forge")?,
            path: component("path")?,
        })
    }

    /// `https://<forge>/<path>.git`
    pub fn to_git_url(&self) -> String {
        format!("https://{}/{}.git", self.forge, self.path)
    }

    /// The path on the forge, `owner/repo` for GitHub repositories.
    pub fn api_path(&self) -> &str {
        &self.path
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.forge, self.path)
    }
}

/// One advertised ref of a remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub commit_hash: String,
    pub name: String,
}

/// Lists refs of a remote repository without cloning it.
pub trait RefLister {
    /// Refs advertised by `url` whose name matches `pattern`, in advertised order.
    /// A ref matches when it equals the pattern or ends with `/<pattern>`.
    fn list_refs(&self, url: &str, pattern: &str) -> Result<Vec<RemoteRef>, GitError>;
}

impl<T: RefLister + ?Sized> RefLister for &T {
    fn list_refs(&self, url: &str, pattern: &str) -> Result<Vec<RemoteRef>, GitError> {
        (**self).list_refs(url, pattern)
    }
}

pub fn ref_matches(name: &str, pattern: &str) -> bool {
    name == pattern
        || name
            .strip_suffix(pattern)
            .is_some_and(|prefix| prefix.ends_with('/'))
}

/// [`RefLister`] backed by libgit2, the equivalent of `git ls-remote <url> <pattern>`.
pub struct GitRemoteLister {
    git_config: Option<Config>,
}

impl GitRemoteLister {
    pub fn new() -> Self {
        let git_config = match Config::open_default() {
            Ok(config) => Some(config),
            Err(error) => {
                debug!("Could not open the default git configuration: {}", error);
                None
            }
        };
        GitRemoteLister { git_config }
    }

    fn callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed_types| {
            trace!(
                "Requested credentials for {}, username {:?}, allowed types {:?}",
                url,
                username,
                allowed_types
            );
            match &self.git_config {
                Some(config) if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) => {
                    Cred::credential_helper(config, url, username)
                }
                _ => Err(git2::Error::from_str("no valid authentication available")),
            }
        });
        callbacks
    }
}

impl Default for GitRemoteLister {
    fn default() -> Self {
        Self::new()
    }
}

impl RefLister for GitRemoteLister {
    fn list_refs(&self, url: &str, pattern: &str) -> Result<Vec<RemoteRef>, GitError> {
        let to_error = |source: git2::Error| GitError::ListRefs {
            url: url.to_string(),
            source,
        };

        debug!("Listing refs of {} matching {}", url, pattern);
        let mut remote = Remote::create_detached(url).map_err(to_error)?;
        let connection = remote
            .connect_auth(Direction::Fetch, Some(self.callbacks()), None)
            .map_err(to_error)?;

        let refs = connection
            .list()
            .map_err(to_error)?
            .iter()
            .filter(|head| ref_matches(head.name(), pattern))
            .map(|head| RemoteRef {
                commit_hash: head.oid().to_string(),
                name: head.name().to_string(),
            })
            .collect();

        Ok(refs)
    }
}
