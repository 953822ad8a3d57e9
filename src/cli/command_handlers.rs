use log::{debug, info};

use crate::{
    git::{branch::BranchResolver, RefLister},
    gomod::{CommandRunner, GoModule},
    http::HttpFetcher,
    manifest::ManifestReader,
    model::dependency::DependencySet,
    resolver::{Ecosystem, Resolver},
    upgrade::{Outcome, Upgrader},
};
use std::path::Path;

/// Handler to generate command
/// 1 - Finds the core library version pinned by the platform release
/// 2 - Finds the tool release pinning the same minor version
/// 3 - Writes the dependency set implied by that release to `output`
pub fn do_generate<H: HttpFetcher>(
    manifests: &ManifestReader<H>,
    ecosystem: &Ecosystem,
    platform_release: &str,
    current_tool_version: &str,
    output: &Path,
) -> anyhow::Result<DependencySet> {
    let resolver = Resolver::new(manifests, ecosystem);
    let dependencies = resolver.resolve(platform_release, current_tool_version)?;
    debug!("Resolved dependencies: {:?}", dependencies);

    dependencies.write_to_file(output)?;
    info!("config saved to {}", output.display());

    Ok(dependencies)
}

/// Handler to upgrade command
/// Loads the dependency file and upgrades the Go module at `project` to it.
pub fn do_upgrade<R, L, H>(
    runner: R,
    branches: &BranchResolver<L, H>,
    config: &Path,
    project: &Path,
) -> anyhow::Result<Vec<Outcome>>
where
    R: CommandRunner,
    L: RefLister,
    H: HttpFetcher,
{
    let dependencies = DependencySet::from_file(config)?;

    let upgrader = Upgrader::new(GoModule::new(runner, project), branches);
    let outcomes = upgrader.apply(&dependencies)?;

    let upgraded = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Outcome::Upgraded { .. }))
        .count();
    info!(
        "{} of {} dependencies upgraded in {}",
        upgraded,
        outcomes.len(),
        project.display()
    );

    Ok(outcomes)
}
