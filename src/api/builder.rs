use std::path::PathBuf;

use crate::{
    config::{GoUpgraderConfig, DEFAULT_API_URL, DEFAULT_RAW_URL},
    git::{branch::BranchResolver, GitRemoteLister},
    gomod::GoCommand,
    http::ReqwestFetcher,
    manifest::ManifestReader,
    resolver::Ecosystem,
    GoUpgrader,
};

#[derive(Default)]
pub struct GoUpgraderBuilder {
    raw_url: Option<String>,
    api_url: Option<String>,
    github_token: Option<String>,
    go_binary: Option<PathBuf>,
    ecosystem: Option<Ecosystem>,
}

impl GoUpgraderBuilder {
    /// Fills every option not set yet from `GOUPGRADER_*` environment variables.
    pub fn with_config(self, config: GoUpgraderConfig) -> Self {
        Self {
            raw_url: self.raw_url.or(config.raw_url),
            api_url: self.api_url.or(config.api_url),
            github_token: self.github_token.or(config.github_token),
            go_binary: self.go_binary.or(config.go_binary),
            ecosystem: self.ecosystem,
        }
    }

    /// Base URL serving raw repository files.
    ///
    /// Defaults to `https://raw.githubusercontent.com`.
    pub fn raw_url(mut self, url: impl Into<String>) -> Self {
        self.raw_url = Some(url.into());
        self
    }

    /// Base URL of the GitHub REST API.
    ///
    /// Defaults to `https://api.github.com`.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Token sent as a bearer credential with every HTTP request.
    pub fn github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    /// The `go` executable.
    ///
    /// Defaults to `go` on the `PATH`.
    pub fn go_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.go_binary = Some(path.into());
        self
    }

    /// Repositories and packages to align.
    ///
    /// Defaults to OpenShift and operator-sdk.
    pub fn ecosystem(mut self, ecosystem: Ecosystem) -> Self {
        self.ecosystem = Some(ecosystem);
        self
    }

    pub fn try_build(self) -> anyhow::Result<GoUpgrader> {
        let Self {
            raw_url,
            api_url,
            github_token,
            go_binary,
            ecosystem,
        } = self;

        let raw_url = raw_url.unwrap_or_else(|| DEFAULT_RAW_URL.to_string());
        let api_url = api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let manifests = ManifestReader::new(ReqwestFetcher::new(github_token.clone())?, raw_url);
        let branches = BranchResolver::new(
            GitRemoteLister::new(),
            ReqwestFetcher::new(github_token)?,
            api_url,
        );

        let go = go_binary.map(GoCommand::new).unwrap_or_default();

        Ok(GoUpgrader {
            manifests,
            branches,
            go,
            ecosystem: ecosystem.unwrap_or_default(),
        })
    }
}
