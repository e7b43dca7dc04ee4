//! Configuration management for `ingest_store`.
//!
//! Database settings are resolved in three layers:
//! - Built-in defaults suitable for a local/dev deployment
//! - An optional YAML file (`--config`)
//! - `APP_DB_*` environment variable overrides

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, StoreError};

pub const ENV_DB_NAME: &str = "APP_DB_NAME";
pub const ENV_DB_DIR: &str = "APP_DB_DIR";
pub const ENV_DB_PATH: &str = "APP_DB_PATH";
pub const ENV_DB_POOL_SIZE: &str = "APP_DB_POOL_SIZE";
pub const ENV_DB_CONNECT_TIMEOUT_MS: &str = "APP_DB_CONNECT_TIMEOUT_MS";
pub const ENV_DB_BUSY_TIMEOUT_MS: &str = "APP_DB_BUSY_TIMEOUT_MS";

/// Database and pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    /// Database name; the file is `<dir>/<name>.db` unless `path` is set.
    pub name: String,
    /// Directory holding the database file.
    pub dir: PathBuf,
    /// Explicit database file, overriding `dir` and `name`.
    pub path: Option<PathBuf>,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// How long a checkout waits for a live connection.
    pub connection_timeout_ms: u64,
    /// How long a statement waits on a locked database.
    pub busy_timeout_ms: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            name: "mlops".to_string(),
            dir: PathBuf::from("."),
            path: None,
            pool_size: 8,
            connection_timeout_ms: 5_000,
            busy_timeout_ms: 5_000,
        }
    }
}

impl DbConfig {
    /// Resolve the config from defaults, an optional YAML file and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `Io`/`ConfigParse` if the file cannot be read or parsed, or
    /// `Config` if an override is malformed or the result is unusable.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML config file; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read or `ConfigParse` if it is not
    /// valid config YAML.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| StoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `APP_DB_*` overrides using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a numeric override does not parse.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(name) = get(ENV_DB_NAME) {
            self.name = name;
        }
        if let Some(dir) = get(ENV_DB_DIR) {
            self.dir = PathBuf::from(dir);
        }
        if let Some(path) = get(ENV_DB_PATH) {
            self.path = Some(PathBuf::from(path));
        }
        if let Some(raw) = get(ENV_DB_POOL_SIZE) {
            self.pool_size = parse_number(ENV_DB_POOL_SIZE, &raw)?;
        }
        if let Some(raw) = get(ENV_DB_CONNECT_TIMEOUT_MS) {
            self.connection_timeout_ms = parse_number(ENV_DB_CONNECT_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = get(ENV_DB_BUSY_TIMEOUT_MS) {
            self.busy_timeout_ms = parse_number(ENV_DB_BUSY_TIMEOUT_MS, &raw)?;
        }
        Ok(())
    }

    /// Check the settings can back a pool.
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first unusable setting.
    pub fn validate(&self) -> Result<()> {
        if self.path.is_none() && self.name.trim().is_empty() {
            return Err(StoreError::Config(
                "database name cannot be empty".to_string(),
            ));
        }
        if self.pool_size == 0 {
            return Err(StoreError::Config("pool_size must be at least 1".to_string()));
        }
        if self.connection_timeout_ms == 0 {
            return Err(StoreError::Config(
                "connection_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Point the config at an explicit database file.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The database file the pool opens.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| self.dir.join(format!("{}.db", self.name)))
    }

    #[must_use]
    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| {
            StoreError::Config(format!(
                "{key} must be a non-negative integer, got '{raw}'"
            ))
        })
}
