use std::num::ParseIntError;
use thiserror::Error;

pub mod dependency;
pub mod version;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading dependency file: {0}")]
    IO(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("invalid version number: {0}")]
    Number(#[from] ParseIntError),
    #[error("invalid version format: {0}")]
    InvalidVersion(String),
    #[error("dependency {package}: {reason}")]
    InvalidDependency { package: String, reason: String },
}
