//! Infrastructure implementation of the `ConfigStore` port.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::{CONFIG_ENV, TOKEN_ENV};
use crate::domain::{ConfigError, FleetConfig};

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
///
/// The path comes from `RUNNER_FLEET_CONFIG`, falling back to
/// `~/.runner-fleet/config.yaml`. An empty `access_token` is filled from
/// `GITHUB_TOKEN`.
#[derive(Default)]
pub struct YamlConfigStore {
    path: Option<PathBuf>,
}

impl YamlConfigStore {
    /// A store reading from an explicit path instead of the environment.
    #[must_use]
    pub fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<FleetConfig> {
        let path = self.path()?;
        if !path.exists() {
            return Err(ConfigError::NotFound(path).into());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: FleetConfig =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        let config = config.with_env_token(std::env::var(TOKEN_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".runner-fleet").join("config.yaml"))
    }
}
