use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::query::HeatmapMode;
use crate::storage::PoolSettings;
use crate::{Error, Result};

pub const DEFAULT_DATABASE: &str = "repopulse.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RepopulseConfig {
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PoolConfig {
    pub max_size: Option<u32>,
    pub connection_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HeatmapConfig {
    pub mode: Option<HeatmapMode>,
}

impl RepopulseConfig {
    /// Config written by `repopulse init`, every field spelled out
    pub fn template() -> Self {
        let pool = PoolSettings::default();
        Self {
            database: Some(DEFAULT_DATABASE.to_string()),
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
            pool: PoolConfig {
                max_size: Some(pool.max_size),
                connection_timeout_secs: Some(pool.connection_timeout.as_secs()),
            },
            heatmap: HeatmapConfig {
                mode: Some(HeatmapMode::default()),
            },
        }
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(self.database.as_deref().unwrap_or(DEFAULT_DATABASE))
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn heatmap_mode(&self) -> HeatmapMode {
        self.heatmap.mode.unwrap_or_default()
    }

    pub fn pool_settings(&self) -> PoolSettings {
        let defaults = PoolSettings::default();
        PoolSettings {
            max_size: self.pool.max_size.unwrap_or(defaults.max_size),
            connection_timeout: self
                .pool
                .connection_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.connection_timeout),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("repopulse.toml")
}

/// Load the config file, `None` if it does not exist
pub fn load_config(path: Option<&Path>) -> Result<Option<RepopulseConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: RepopulseConfig =
        toml::from_str(&contents).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &RepopulseConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    let contents = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}
