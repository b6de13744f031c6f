//! Configuration loading and typed config structures for Cartograph.
//!
//! The canonical configuration lives in `cartograph-config.yaml` at the
//! project root. Every section and field has a default, so a missing or
//! partial file still yields a usable configuration.

use std::path::Path;

use cartograph_explore::{DangerRules, ExplorationSettings, SeededTerrain};
use cartograph_nav::RouterSettings;
use cartograph_types::BlockPos;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Cartograph configuration.
///
/// Mirrors the structure of `cartograph-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CartographConfig {
    /// Synthetic terrain settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Frontier scheduling tunables.
    #[serde(default)]
    pub exploration: ExplorationSettings,

    /// Danger scoring weights and biome lists.
    #[serde(default)]
    pub danger: DangerRules,

    /// Routing tunables.
    #[serde(default)]
    pub navigation: RouterSettings,

    /// Infrastructure connection settings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Background explorer loop settings.
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

impl CartographConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    /// (with environment overrides still applied).
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        let mut config = Self::default();
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_min_y() -> i32 {
    -64
}

const fn default_max_y() -> i32 {
    320
}

fn default_dragonfly_url() -> String {
    "redis://localhost:6379".to_owned()
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

const fn default_origin() -> BlockPos {
    BlockPos::new(0, 64, 0)
}

const fn default_frontier_radius() -> u32 {
    128
}

const fn default_batch_size() -> usize {
    4
}

const fn default_idle_secs() -> u64 {
    5
}

const fn default_snapshot_interval_secs() -> u64 {
    60
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Synthetic terrain configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Terrain seed.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Lowest block layer (inclusive).
    #[serde(default = "default_min_y")]
    pub min_y: i32,

    /// Build height limit (exclusive).
    #[serde(default = "default_max_y")]
    pub max_y: i32,
}

impl WorldConfig {
    /// The sampler described by this section.
    pub fn terrain(&self) -> SeededTerrain {
        SeededTerrain::new(self.seed).with_height_range(self.min_y, self.max_y)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            min_y: default_min_y(),
            max_y: default_max_y(),
        }
    }
}

/// Infrastructure connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// Dragonfly (Redis-compatible) URL.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,

    /// Address the observer binds to.
    #[serde(default = "default_observer_host")]
    pub observer_host: String,

    /// Observer HTTP port.
    #[serde(default = "default_observer_port")]
    pub observer_port: u16,
}

impl InfrastructureConfig {
    /// Override settings with environment variables when set.
    ///
    /// Reads `DRAGONFLY_URL` and `OBSERVER_PORT`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override settings from an arbitrary variable lookup.
    ///
    /// An `OBSERVER_PORT` that is not a valid port is ignored with a
    /// warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("DRAGONFLY_URL") {
            self.dragonfly_url = val;
        }
        if let Some(val) = lookup("OBSERVER_PORT") {
            match val.parse() {
                Ok(port) => self.observer_port = port,
                Err(e) => tracing::warn!(value = %val, error = %e, "Ignoring invalid OBSERVER_PORT"),
            }
        }
    }

    /// `host:port` for the observer listener.
    pub fn observer_addr(&self) -> String {
        format!("{}:{}", self.observer_host, self.observer_port)
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            dragonfly_url: default_dragonfly_url(),
            observer_host: default_observer_host(),
            observer_port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error).
    /// `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Background explorer loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExplorerConfig {
    /// Run the explorer at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Centre of the frontier the explorer expands.
    #[serde(default = "default_origin")]
    pub origin: BlockPos,

    /// Frontier radius in blocks.
    #[serde(default = "default_frontier_radius")]
    pub frontier_radius: u32,

    /// Cells scanned concurrently per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause when the frontier is exhausted.
    #[serde(default = "default_idle_secs")]
    pub idle_secs: u64,

    /// Seconds between state snapshots.
    #[serde(default = "default_snapshot_interval_secs")]
    pub snapshot_interval_secs: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            origin: default_origin(),
            frontier_radius: default_frontier_radius(),
            batch_size: default_batch_size(),
            idle_secs: default_idle_secs(),
            snapshot_interval_secs: default_snapshot_interval_secs(),
        }
    }
}
