use std::{fmt::Display, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::ParseError;

/// What a dependency should be moved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// A tagged release or pseudo-version, e.g. `v0.19.7`.
    Version(String),
    /// A branch of the package's repository, resolved at upgrade time.
    Branch(String),
}

impl Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Version(version) => f.write_str(version),
            Constraint::Branch(branch) => write!(f, "branch {branch}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDependency", into = "RawDependency")]
pub struct DependencySpec {
    package: String,
    constraint: Constraint,
}

impl DependencySpec {
    /// Pins `package` to a version. Fails when the version is blank.
    pub fn version(
        package: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, ParseError> {
        DependencySpec::try_from(RawDependency {
            package: package.into(),
            version: Some(version.into()),
            branch: None,
        })
    }

    /// Pins `package` to the head of a branch. Fails when the branch is blank.
    pub fn branch(
        package: impl Into<String>,
        branch: impl Into<String>,
    ) -> Result<Self, ParseError> {
        DependencySpec::try_from(RawDependency {
            package: package.into(),
            version: None,
            branch: Some(branch.into()),
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }
}

/// On-disk shape of a dependency entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawDependency {
    package: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    branch: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl TryFrom<RawDependency> for DependencySpec {
    type Error = ParseError;

    fn try_from(raw: RawDependency) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| ParseError::InvalidDependency {
            package: raw.package.clone(),
            reason: reason.to_string(),
        };

        let constraint = match (is_blank(&raw.version), is_blank(&raw.branch)) {
            (false, false) => return Err(invalid("cannot specify both version and branch")),
            (false, true) => Constraint::Version(raw.version.clone().unwrap_or_default()),
            (true, false) => Constraint::Branch(raw.branch.clone().unwrap_or_default()),
            (true, true) if raw.version.as_deref().is_some_and(|v| !v.is_empty()) => {
                return Err(invalid("version cannot be an empty string"))
            }
            (true, true) if raw.branch.as_deref().is_some_and(|b| !b.is_empty()) => {
                return Err(invalid("branch cannot be an empty string"))
            }
            (true, true) => return Err(invalid("must specify either version or branch")),
        };

        Ok(DependencySpec {
            package: raw.package,
            constraint,
        })
    }
}

impl From<DependencySpec> for RawDependency {
    fn from(spec: DependencySpec) -> Self {
        let (version, branch) = match spec.constraint {
            Constraint::Version(version) => (Some(version), None),
            Constraint::Branch(branch) => (None, Some(branch)),
        };
        RawDependency {
            package: spec.package,
            version,
            branch,
        }
    }
}

/// Ordered list of dependencies to align, as written to and read from the
/// dependency file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySet {
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

impl DependencySet {
    pub fn new(dependencies: Vec<DependencySpec>) -> Self {
        DependencySet { dependencies }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencySpec> {
        self.dependencies.iter()
    }

    /// Reads a dependency file. Files with a `.toml` extension are read as TOML,
    /// anything else as YAML.
    pub fn from_file(path: &Path) -> Result<DependencySet, ParseError> {
        debug!("Reading dependency file {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        match FileFormat::of(path) {
            FileFormat::Toml => DependencySet::from_toml_str(&contents),
            FileFormat::Yaml => DependencySet::from_yaml_str(&contents),
        }
    }

    pub fn from_yaml_str(data: &str) -> Result<DependencySet, ParseError> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn from_toml_str(data: &str) -> Result<DependencySet, ParseError> {
        Ok(toml::from_str(data)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, ParseError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ParseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Writes the set to `path`, readable and writable by the owner only.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ParseError> {
        let contents = match FileFormat::of(path) {
            FileFormat::Toml => self.to_toml_string()?,
            FileFormat::Yaml => self.to_yaml_string()?,
        };
        write_private(path, contents.as_bytes())?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a DependencySpec;
    type IntoIter = std::slice::Iter<'a, DependencySpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.dependencies.iter()
    }
}

enum FileFormat {
    Yaml,
    Toml,
}

impl FileFormat {
    fn of(path: &Path) -> FileFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => FileFormat::Toml,
            _ => FileFormat::Yaml,
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::{fs::OpenOptions, io::Write, os::unix::fs::OpenOptionsExt};

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn parse_error(yaml: &str) -> String {
        DependencySet::from_yaml_str(yaml)
            .expect_err("should be rejected")
            .to_string()
    }

    #[test]
    fn load_yaml() {
        let yaml = r#"dependencies:
  - package: "sigs.k8s.io/controller-runtime"
    version: "v0.19.3"
  - package: "github.com/openshift/api"
    branch: "release-4.18"
"#;
        let set = DependencySet::from_yaml_str(yaml).unwrap();
        assert_eq!(
            set,
            DependencySet::new(vec![
                DependencySpec::version("sigs.k8s.io/controller-runtime", "v0.19.3").unwrap(),
                DependencySpec::branch("github.com/openshift/api", "release-4.18").unwrap(),
            ])
        );
    }

    #[test]
    fn both_version_and_branch() {
        let message = parse_error(
            r#"dependencies:
  - package: "sigs.k8s.io/controller-runtime"
    version: "v0.19.3"
    branch: "release-4.18""#,
        );
        assert!(
            message.contains(
                "dependency sigs.k8s.io/controller-runtime: cannot specify both version and branch"
            ),
            "{message}"
        );
    }

    #[test]
    fn neither_version_nor_branch() {
        let message = parse_error(
            r#"dependencies:
  - package: "sigs.k8s.io/controller-runtime""#,
        );
        assert!(
            message.contains(
                "dependency sigs.k8s.io/controller-runtime: must specify either version or branch"
            ),
            "{message}"
        );
    }

    #[test]
    fn blank_values() {
        let message = parse_error(
            r#"dependencies:
  - package: "k8s.io/api"
    version: "   ""#,
        );
        assert!(
            message.contains("dependency k8s.io/api: version cannot be an empty string"),
            "{message}"
        );

        let message = parse_error(
            r#"dependencies:
  - package: "k8s.io/api"
    branch: "\t""#,
        );
        assert!(
            message.contains("dependency k8s.io/api: branch cannot be an empty string"),
            "{message}"
        );

        let message = parse_error(
            r#"dependencies:
  - package: "k8s.io/api"
    version: ""
    branch: """#,
        );
        assert!(
            message.contains("must specify either version or branch"),
            "{message}"
        );
    }

    #[test]
    fn blank_value_next_to_a_real_one_is_ignored() {
        let set = DependencySet::from_yaml_str(
            r#"dependencies:
  - package: "k8s.io/api"
    version: "v0.31.1"
    branch: "  ""#,
        )
        .unwrap();
        assert_eq!(
            set.dependencies,
            vec![DependencySpec::version("k8s.io/api", "v0.31.1").unwrap()]
        );
    }

    #[test]
    fn constructors_reject_blank_values() {
        let err = DependencySpec::version("k8s.io/api", " ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "dependency k8s.io/api: version cannot be an empty string"
        );
        let err = DependencySpec::branch("github.com/openshift/api", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "dependency github.com/openshift/api: must specify either version or branch"
        );

        let spec = DependencySpec::branch("github.com/openshift/api", "release-4.18").unwrap();
        assert_eq!(spec.package(), "github.com/openshift/api");
        assert_eq!(
            spec.constraint(),
            &Constraint::Branch("release-4.18".to_string())
        );
    }

    #[test]
    fn save_yaml() {
        let set = DependencySet::new(vec![
            DependencySpec::version("sigs.k8s.io/controller-tools", "v0.16.5").unwrap(),
            DependencySpec::branch("github.com/openshift/library-go", "release-4.18").unwrap(),
        ]);
        assert_eq!(
            set.to_yaml_string().unwrap(),
            "dependencies:
- package: sigs.k8s.io/controller-tools
  version: v0.16.5
- package: github.com/openshift/library-go
  branch: release-4.18
"
        );
    }

    #[test]
    fn load_save_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dependencies.toml");
        let set = DependencySet::new(vec![
            DependencySpec::version("github.com/operator-framework/api", "v0.27.0").unwrap(),
            DependencySpec::branch("github.com/openshift/api", "release-4.18").unwrap(),
        ]);

        set.write_to_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[[dependencies]]"), "{text}");
        assert_eq!(DependencySet::from_file(&path).unwrap(), set);
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dependencies.yaml");
        DependencySet::default().write_to_file(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
