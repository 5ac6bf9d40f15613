//! Configuration loading from TOML.
//!
//! Reads an optional `config.toml` into strongly-typed structs. Every field
//! has a default, so a missing file or a partial file is fine. Command-line
//! flags override what is loaded here.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub companion: CompanionConfig,
    pub files: FilesConfig,
    pub store: StoreConfig,
    pub eddn: EddnConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CompanionConfig {
    /// Base URL every companion path is resolved against.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://companion.orerve.net/".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FilesConfig {
    /// Prefix for `.cookies` and `.vars`.
    pub basename: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            basename: "edapi".into(),
        }
    }
}

impl FilesConfig {
    pub fn cookie_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.cookies", self.basename))
    }

    pub fn vars_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.vars", self.basename))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite URL of the local trading database, e.g. `sqlite://data/TradeDangerous.db`.
    pub database_url: Option<String>,
    /// Directory that receives refreshed table exports.
    pub export_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            export_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EddnConfig {
    pub upload_url: String,
    pub software_name: String,
    pub software_version: String,
    pub commodity_schema: String,
    pub shipyard_schema: String,
    pub outfitting_schema: String,
    pub timeout_secs: u64,
}

impl Default for EddnConfig {
    fn default() -> Self {
        Self {
            upload_url: "https://eddn.edcd.io:4430/upload/".into(),
            software_name: "EDAPI".into(),
            software_version: env!("CARGO_PKG_VERSION").into(),
            commodity_schema: "https://eddn.edcd.io/schemas/commodity/3".into(),
            shipyard_schema: "https://eddn.edcd.io/schemas/shipyard/2".into(),
            outfitting_schema: "https://eddn.edcd.io/schemas/outfitting/1".into(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
