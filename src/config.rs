//! Configuration loading with layered overrides.
//!
//! Layers, each overriding the previous:
//! 1. Default values
//! 2. Config file (TOML)
//! 3. Environment variables (`{PREFIX}_STORE_PATH`, `{PREFIX}_MAP_SIZE`,
//!    `{PREFIX}_RETAIN_STALE`, `{PREFIX}_MAX_DEPTH`)

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ENV_PREFIX, DEFAULT_MAP_SIZE, DEFAULT_STORE_PATH, ENV_MAP_SIZE, ENV_MAX_DEPTH,
    ENV_RETAIN_STALE, ENV_STORE_PATH, MAX_CATALOG_DEPTH,
};
use crate::error::{PermTreeError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// LMDB location and sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_map_size")]
    pub map_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: default_store_path(), map_size: default_map_size() }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

/// Editing session behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Carry grants the current catalog no longer knows through to save.
    #[serde(default)]
    pub retain_stale_grants: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { max_depth: default_max_depth() }
    }
}

fn default_max_depth() -> usize {
    MAX_CATALOG_DEPTH
}

/// Builder for loading configuration.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix (e.g. "PERMTREE" -> PERMTREE_STORE_PATH)
    pub env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self { env_prefix: DEFAULT_ENV_PREFIX.to_string() }
    }
}

impl ConfigLoader {
    pub fn new(env_prefix: impl Into<String>) -> Self {
        Self { env_prefix: env_prefix.into() }
    }

    /// Load defaults, then `config_path` if given, then environment overrides.
    pub fn load(&self, config_path: Option<&Path>) -> Result<Config> {
        let mut config: Config = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| PermTreeError::Config(format!("Failed to read config file: {e}")))?;
                toml::from_str(&content)
                    .map_err(|e| PermTreeError::Config(format!("Failed to parse config: {e}")))?
            }
            None => Config::default(),
        };

        if let Some(path) = self.var(ENV_STORE_PATH) {
            config.store.path = PathBuf::from(path);
        }
        if let Some(size) = self.parsed(ENV_MAP_SIZE)? {
            config.store.map_size = size;
        }
        if let Some(retain) = self.parsed(ENV_RETAIN_STALE)? {
            config.editor.retain_stale_grants = retain;
        }
        if let Some(depth) = self.parsed(ENV_MAX_DEPTH)? {
            config.catalog.max_depth = depth;
        }

        if config.catalog.max_depth == 0 {
            return Err(PermTreeError::Config("catalog.max_depth must be at least 1".into()));
        }
        Ok(config)
    }

    fn var(&self, name: &str) -> Option<String> {
        std::env::var(format!("{}_{}", self.env_prefix, name)).ok()
    }

    fn parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>> {
        match self.var(name) {
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                PermTreeError::Config(format!("{}_{} has invalid value '{}'", self.env_prefix, name, raw))
            }),
            None => Ok(None),
        }
    }
}
