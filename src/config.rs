//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/batch-loader/config.toml` (XDG) or platform config dir
//! 2. Project config: `.batch-loader.toml`
//! 3. Environment variables: `BATCH_LOADER_*`

use std::ops::Deref;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Transaction isolation level requested for a `loadGraphData` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl Default for IsolationLevel {
    fn default() -> Self {
        IsolationLevel::ReadCommitted
    }
}

impl IsolationLevel {
    /// The `SET TRANSACTION ISOLATION LEVEL ...` clause for this level.
    pub fn as_sql(self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// PostgreSQL + Apache AGE connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub uri: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_pool_size() -> usize {
    16
}

/// Defaults for the Loader Orchestrator, overridable per call via `LoadOptions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub graph_name: String,
    pub schema_namespace: String,
    pub batch_size: u32,
    pub validate_before_load: bool,
    pub continue_on_error: bool,
    pub transaction_timeout_ms: u32,
    pub isolation_level: IsolationLevel,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            graph_name: "default_graph".to_string(),
            schema_namespace: "batch_loader".to_string(),
            batch_size: 1000,
            validate_before_load: true,
            continue_on_error: false,
            transaction_timeout_ms: 60_000,
            isolation_level: IsolationLevel::ReadCommitted,
        }
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        let user_config = Self::user_config_path();

        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(".batch-loader.toml"))
            // Layer 3: Environment variables (highest priority)
            // Use double underscore for nesting (e.g., BATCH_LOADER_LOADER__BATCH_SIZE -> loader.batch_size)
            .merge(Env::prefixed("BATCH_LOADER_").map(|key| key.as_str().replace("__", ".").into()))
            .extract()
            .map_err(ConfigError::from)
    }

    /// User config path: ~/.config/batch-loader/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("batch-loader").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("batch-loader").join("config.toml"))
            .unwrap_or_default()
    }
}
