use std::{collections::HashMap, path::PathBuf};

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

pub struct GoUpgraderConfig {
    pub raw_url: Option<String>,
    pub api_url: Option<String>,
    pub github_token: Option<String>,
    pub go_binary: Option<PathBuf>,
}

impl GoUpgraderConfig {
    pub fn load() -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(None)?;

        Ok(Self {
            raw_url: raw_config.github.raw,
            api_url: raw_config.github.api,
            github_token: raw_config.github.token,
            go_binary: raw_config.go.binary,
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    github: GithubConfig,
    #[serde(default)]
    go: GoConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct GithubConfig {
    raw: Option<String>,
    api: Option<String>,
    token: Option<String>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct GoConfig {
    binary: Option<PathBuf>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("GOUPGRADER")
                    .separator("_")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
