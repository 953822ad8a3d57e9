use log::{debug, info};
use thiserror::Error;

use crate::{
    git::{
        branch::{BranchError, BranchResolver},
        RefLister,
    },
    gomod::{CommandRunner, GoModError, GoModule},
    http::HttpFetcher,
    model::{
        dependency::{Constraint, DependencySet, DependencySpec},
        version::needs_upgrade,
    },
};

#[derive(Error, Debug)]
pub enum UpgradeError {
    #[error(transparent)]
    Branch(#[from] BranchError),
    #[error(transparent)]
    Module(#[from] GoModError),
}

/// What happened to a single dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Upgraded { from: String, to: String },
    UpToDate { current: String, requested: String },
    NotRequired,
}

/// Moves the requirements of a Go module forward to a [`DependencySet`].
pub struct Upgrader<'a, R, L, H> {
    module: GoModule<'a, R>,
    branches: &'a BranchResolver<L, H>,
}

impl<'a, R, L, H> Upgrader<'a, R, L, H>
where
    R: CommandRunner,
    L: RefLister,
    H: HttpFetcher,
{
    pub fn new(module: GoModule<'a, R>, branches: &'a BranchResolver<L, H>) -> Self {
        Upgrader { module, branches }
    }

    /// Upgrades every dependency in order and stops at the first failure. Upgrades
    /// already done are kept.
    pub fn apply(&self, dependencies: &DependencySet) -> Result<Vec<Outcome>, UpgradeError> {
        dependencies
            .iter()
            .map(|dependency| self.apply_one(dependency))
            .collect()
    }

    pub fn apply_one(&self, dependency: &DependencySpec) -> Result<Outcome, UpgradeError> {
        let package = dependency.package();
        debug!("Processing {} ({})", package, dependency.constraint());
        let requested = match dependency.constraint() {
            Constraint::Version(version) => version.clone(),
            Constraint::Branch(branch) => self.branches.pseudo_version(package, branch)?,
        };
        self.upgrade_package(package, &requested)
    }

    fn upgrade_package(&self, package: &str, requested: &str) -> Result<Outcome, UpgradeError> {
        let Some(current) = self.module.required_version(package)? else {
            info!("skipping {}: not found in go.mod", package);
            return Ok(Outcome::NotRequired);
        };

        if !needs_upgrade(&current, requested) {
            info!(
                "no upgrade needed for {}: current version {} >= requested version {}",
                package, current, requested
            );
            return Ok(Outcome::UpToDate {
                current,
                requested: requested.to_string(),
            });
        }

        info!("upgrading {} from {} to {}...", package, current, requested);
        self.module.get(package, requested)?;
        self.module.tidy()?;
        info!(
            "upgrade {} from {} to {} finished successfully",
            package, current, requested
        );

        Ok(Outcome::Upgraded {
            from: current,
            to: requested.to_string(),
        })
    }
}
