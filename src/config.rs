//! Configuration file handling
//!
//! A single YAML file under the platform config directory selects the storage
//! backend and, for RocksDB, the database path.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::adapter::StoreBackend;

/// Persisted configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Storage backend for all entity stores
    pub backend: StoreBackend,
    /// RocksDB database directory; `None` falls back to the platform data dir
    pub db_path: Option<PathBuf>
}

impl Default for Config {
    fn default() -> Self {
        Self { backend: StoreBackend::RocksDb, db_path: None }
    }
}

/// Project directories for cross-platform path resolution
pub fn get_project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "bpm").context("Failed to determine project directories")
}

/// Path of the configuration file
pub fn get_config_file_path() -> Result<PathBuf> {
    let project_dirs = get_project_dirs()?;
    Ok(project_dirs.config_dir().join("config.yaml"))
}

/// Default database directory when the config file does not name one
pub fn get_default_db_path() -> Result<PathBuf> {
    let project_dirs = get_project_dirs()?;
    Ok(project_dirs.data_dir().join("db"))
}

/// Load configuration from file or create the default if it does not exist
pub fn load_config() -> Result<Config> {
    let config_path = get_config_file_path()?;

    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        serde_yaml::from_str(&content).with_context(|| "Failed to parse config file")
    } else {
        let config = Config::default();
        save_config(&config)?;
        Ok(config)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config) -> Result<()> {
    let config_path = get_config_file_path()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let content = serde_yaml::to_string(config).context("Failed to serialize config")?;

    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    Ok(())
}
