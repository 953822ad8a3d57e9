use std::path::Path;

use crate::{
    cli::command_handlers::{do_generate, do_upgrade},
    git::{branch::BranchResolver, GitRemoteLister},
    gomod::GoCommand,
    http::ReqwestFetcher,
    manifest::ManifestReader,
    model::dependency::DependencySet,
    resolver::{Ecosystem, Resolver},
    upgrade::Outcome,
};

mod builder;

pub use builder::GoUpgraderBuilder;

pub struct GoUpgrader {
    manifests: ManifestReader<ReqwestFetcher>,
    branches: BranchResolver<GitRemoteLister, ReqwestFetcher>,
    go: GoCommand,
    ecosystem: Ecosystem,
}

impl GoUpgrader {
    pub fn builder() -> GoUpgraderBuilder {
        GoUpgraderBuilder::default()
    }

    /// Resolves the dependency set matching an OpenShift release without writing it
    pub fn resolve(
        &self,
        platform_release: &str,
        current_tool_version: &str,
    ) -> anyhow::Result<DependencySet> {
        let resolver = Resolver::new(&self.manifests, &self.ecosystem);
        Ok(resolver.resolve(platform_release, current_tool_version)?)
    }

    /// Generates a dependency file matching an OpenShift release
    pub fn generate(
        &self,
        platform_release: &str,
        current_tool_version: &str,
        output: impl AsRef<Path>,
    ) -> anyhow::Result<DependencySet> {
        do_generate(
            &self.manifests,
            &self.ecosystem,
            platform_release,
            current_tool_version,
            output.as_ref(),
        )
    }

    /// Upgrades the Go module at `project` to the dependencies listed in `config`
    pub fn upgrade(
        &self,
        config: impl AsRef<Path>,
        project: impl AsRef<Path>,
    ) -> anyhow::Result<Vec<Outcome>> {
        do_upgrade(&self.go, &self.branches, config.as_ref(), project.as_ref())
    }
}
