use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Aligns Go project dependencies with a target OpenShift release.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Token for GitHub requests, lifts the anonymous API rate limit
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub github_token: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generates a dependency file matching a target OpenShift release.
    ///
    /// Finds the Kubernetes version used by the OpenShift release, looks for the
    /// operator-sdk release built against the same Kubernetes minor version and
    /// writes the dependency versions of that release to the output file.
    Generate {
        /// OpenShift version you wish to upgrade dependencies to, e.g. 4.18
        #[clap(short, long = "target-openshift-version")]
        target_openshift_version: String,
        /// operator-sdk version currently used by your Go project, e.g. v1.39.0
        #[clap(short, long = "in-use-op-sdk-version")]
        in_use_op_sdk_version: String,
        /// Where to write the dependency file (.yaml or .toml)
        #[clap(short, long)]
        output: PathBuf,
    },
    /// Upgrades Go project dependencies based on a dependency file.
    ///
    /// Each dependency defines a version or a branch; packages behind the
    /// requested version are upgraded with `go get` followed by `go mod tidy`.
    Upgrade {
        /// Path to the dependency file
        #[clap(short, long)]
        config: PathBuf,
        /// Path to the target Go project
        #[clap(short, long)]
        project: PathBuf,
    },
}
