use log::info;
use thiserror::Error;

use crate::{
    http::HttpFetcher,
    manifest::{ManifestError, ManifestReader},
    model::{
        dependency::{DependencySet, DependencySpec},
        version::{candidate_tool_versions, same_minor},
        ParseError,
    },
};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to get {package} version used by {repository}@{reference}: {source}")]
    Platform {
        package: String,
        repository: String,
        reference: String,
        source: ManifestError,
    },
    #[error("failed to get version for {package}: {source}")]
    Dependency {
        package: String,
        source: ManifestError,
    },
    #[error(transparent)]
    Version(#[from] ParseError),
    #[error("no matching {tool} version found for {package} {version}")]
    NoMatch {
        tool: String,
        package: String,
        version: String,
    },
}

/// Where the platform and the intermediate tool live, and which packages each of
/// them decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ecosystem {
    /// Repository whose `release-<version>` branches pin the core library.
    pub platform_repository: String,
    /// Repository tagged with one `vX.Y.Z` per tool release.
    pub tool_repository: String,
    /// Library both sides must agree on, compared by minor version.
    pub core_library: String,
    /// Packages pinned to the version the matching tool release requires.
    pub tool_packages: Vec<String>,
    /// Packages that follow the platform's release branch.
    pub platform_packages: Vec<String>,
}

impl Ecosystem {
    pub fn release_branch(platform_release: &str) -> String {
        format!("release-{platform_release}")
    }

    fn tool_name(&self) -> &str {
        self.tool_repository
            .rsplit('/')
            .next()
            .unwrap_or(&self.tool_repository)
    }
}

impl Default for Ecosystem {
    fn default() -> Self {
        Ecosystem {
            platform_repository: "openshift/api".to_string(),
            tool_repository: "operator-framework/operator-sdk".to_string(),
            core_library: "k8s.io/api".to_string(),
            tool_packages: vec![
                "sigs.k8s.io/controller-runtime".to_string(),
                "github.com/operator-framework/api".to_string(),
                "github.com/operator-framework/operator-registry".to_string(),
                "sigs.k8s.io/controller-tools".to_string(),
            ],
            platform_packages: vec![
                "github.com/openshift/api".to_string(),
                "github.com/openshift/library-go".to_string(),
            ],
        }
    }
}

/// Finds the tool release aligned with a platform release and derives the
/// dependency set it implies.
pub struct Resolver<'a, H> {
    manifests: &'a ManifestReader<H>,
    ecosystem: &'a Ecosystem,
}

impl<'a, H: HttpFetcher> Resolver<'a, H> {
    pub fn new(manifests: &'a ManifestReader<H>, ecosystem: &'a Ecosystem) -> Self {
        Resolver {
            manifests,
            ecosystem,
        }
    }

    pub fn resolve(
        &self,
        platform_release: &str,
        current_tool_version: &str,
    ) -> Result<DependencySet, ResolveError> {
        let platform_core_version = self.platform_core_version(platform_release)?;
        info!(
            "{} version used by {} {}: {}",
            self.ecosystem.core_library,
            self.ecosystem.platform_repository,
            platform_release,
            platform_core_version
        );

        let tool_version =
            self.matching_tool_version(&platform_core_version, current_tool_version)?;

        self.dependency_set(&tool_version, platform_release)
    }

    fn platform_core_version(&self, platform_release: &str) -> Result<String, ResolveError> {
        let Ecosystem {
            platform_repository,
            core_library,
            ..
        } = self.ecosystem;
        let reference = Ecosystem::release_branch(platform_release);
        self.manifests
            .declared_version(platform_repository, &reference, core_library)
            .map_err(|source| ResolveError::Platform {
                package: core_library.clone(),
                repository: platform_repository.clone(),
                reference,
                source,
            })
    }

    /// Probes candidate tool releases, newest first, and returns the first one
    /// whose core library shares the platform's minor version.
    pub fn matching_tool_version(
        &self,
        platform_core_version: &str,
        current_tool_version: &str,
    ) -> Result<String, ResolveError> {
        let Ecosystem {
            tool_repository,
            core_library,
            ..
        } = self.ecosystem;

        for candidate in candidate_tool_versions(current_tool_version)? {
            let lookup = self
                .manifests
                .declared_version(tool_repository, &candidate, core_library);
            let core_version = match lookup {
                Ok(version) => version,
                Err(error) => {
                    info!(
                        "skipping {} version {}: {}",
                        self.ecosystem.tool_name(),
                        candidate,
                        error
                    );
                    continue;
                }
            };

            if same_minor(&core_version, platform_core_version)? {
                info!(
                    "match found! {} {} uses {} {}",
                    self.ecosystem.tool_name(),
                    candidate,
                    core_library,
                    core_version
                );
                return Ok(candidate);
            }
        }

        Err(ResolveError::NoMatch {
            tool: self.ecosystem.tool_name().to_string(),
            package: core_library.clone(),
            version: platform_core_version.to_string(),
        })
    }

    /// Pins tool packages to what `tool_version` requires and platform packages to
    /// the platform's release branch.
    pub fn dependency_set(
        &self,
        tool_version: &str,
        platform_release: &str,
    ) -> Result<DependencySet, ResolveError> {
        let mut dependencies = Vec::new();

        for package in &self.ecosystem.tool_packages {
            let version = self
                .manifests
                .declared_version(&self.ecosystem.tool_repository, tool_version, package)
                .map_err(|source| ResolveError::Dependency {
                    package: package.clone(),
                    source,
                })?;
            dependencies.push(DependencySpec::version(package, version)?);
        }

        let branch = Ecosystem::release_branch(platform_release);
        for package in &self.ecosystem.platform_packages {
            dependencies.push(DependencySpec::branch(package, &branch)?);
        }

        Ok(DependencySet::new(dependencies))
    }
}
