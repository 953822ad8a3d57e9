use std::{
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{command} exited with {status}")]
    Failed { command: String, status: ExitStatus },
    #[cfg(test)]
    #[error("{0}")]
    Other(String),
}

/// Runs external commands in a working directory.
pub trait CommandRunner {
    /// Runs the command and returns what it wrote to stdout.
    fn output(&self, dir: &Path, args: &[&str]) -> Result<Vec<u8>, CommandError>;
    /// Runs the command with stdout and stderr inherited from this process.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<(), CommandError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn output(&self, dir: &Path, args: &[&str]) -> Result<Vec<u8>, CommandError> {
        (**self).output(dir, args)
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<(), CommandError> {
        (**self).run(dir, args)
    }
}

/// The `go` toolchain binary.
pub struct GoCommand {
    binary: PathBuf,
}

impl GoCommand {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        GoCommand {
            binary: binary.into(),
        }
    }

    fn command(&self, dir: &Path, args: &[&str]) -> Command {
        debug!(
            "Running {} {} in {}",
            self.binary.display(),
            args.join(" "),
            dir.display()
        );
        let mut command = Command::new(&self.binary);
        command.args(args).current_dir(dir);
        command
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.binary.display(), args.join(" "))
    }

    fn spawn_error(&self, source: std::io::Error) -> CommandError {
        CommandError::Spawn {
            program: self.binary.display().to_string(),
            source,
        }
    }
}

impl Default for GoCommand {
    fn default() -> Self {
        GoCommand::new("go")
    }
}

impl CommandRunner for GoCommand {
    fn output(&self, dir: &Path, args: &[&str]) -> Result<Vec<u8>, CommandError> {
        let output = self
            .command(dir, args)
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| self.spawn_error(e))?;
        if !output.status.success() {
            return Err(CommandError::Failed {
                command: self.describe(args),
                status: output.status,
            });
        }
        Ok(output.stdout)
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<(), CommandError> {
        let status = self
            .command(dir, args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| self.spawn_error(e))?;
        if !status.success() {
            return Err(CommandError::Failed {
                command: self.describe(args),
                status,
            });
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum GoModError {
    #[error("failed to run 'go mod edit': {0}")]
    Edit(#[source] CommandError),
    #[error("failed to parse go.mod JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("error upgrading dependency {package}: {source}")]
    Get {
        package: String,
        source: CommandError,
    },
    #[error("error running go mod tidy: {0}")]
    Tidy(#[source] CommandError),
}

/// `go mod edit -json` output, reduced to the requirements.
#[derive(Debug, Default, Deserialize)]
struct ModFile {
    #[serde(rename = "Require", default)]
    require: Option<Vec<Requirement>>,
}

#[derive(Debug, Deserialize)]
struct Requirement {
    #[serde(rename = "Path")]
    path: String,
    #[serde(rename = "Version")]
    version: String,
}

/// A Go module on disk, driven through the `go` command.
pub struct GoModule<'a, R> {
    runner: R,
    dir: &'a Path,
}

impl<'a, R: CommandRunner> GoModule<'a, R> {
    pub fn new(runner: R, dir: &'a Path) -> Self {
        GoModule { runner, dir }
    }

    /// Version of `package` currently required by the module, read straight from
    /// its `go.mod`. `None` when the module does not require the package.
    pub fn required_version(&self, package: &str) -> Result<Option<String>, GoModError> {
        info!("checking current version for package {}...", package);
        let output = self
            .runner
            .output(self.dir, &["mod", "edit", "-json"])
            .map_err(GoModError::Edit)?;

        let mod_file: ModFile = serde_json::from_slice(&output)?;
        Ok(mod_file
            .require
            .unwrap_or_default()
            .into_iter()
            .find(|requirement| requirement.path == package)
            .map(|requirement| requirement.version))
    }

    /// `go get package@version`
    pub fn get(&self, package: &str, version: &str) -> Result<(), GoModError> {
        let target = format!("{package}@{version}");
        self.runner
            .run(self.dir, &["get", target.as_str()])
            .map_err(|source| GoModError::Get {
                package: package.to_string(),
                source,
            })
    }

    /// `go mod tidy`
    pub fn tidy(&self) -> Result<(), GoModError> {
        self.runner
            .run(self.dir, &["mod", "tidy"])
            .map_err(GoModError::Tidy)
    }
}
