//! Configuration loading and config file resolution
//!
//! Bootstrap configuration comes from an optional TOML file. Every field has
//! a built-in default, so a missing file only produces a warning.
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `EMO_MIRROR_CONFIG` environment variable
//! 3. `<config_dir>/emo-mirror/config.toml` if it exists
//! 4. Built-in defaults (no file)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "EMO_MIRROR_CONFIG";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub events: EventsConfig,

    #[serde(default)]
    pub avatar: AvatarConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Mock classifier settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    /// Simulated inference latency in milliseconds
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Seed for reproducible scores (random when absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Event bus settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EventsConfig {
    /// Events buffered per subscriber before lagging
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

/// Avatar presentation settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AvatarConfig {
    /// How long the pulse lasts after a new top emotion, in milliseconds
    #[serde(default = "default_pulse_ms")]
    pub pulse_ms: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_latency_ms() -> u64 {
    2000
}

fn default_event_capacity() -> usize {
    100
}

fn default_pulse_ms() -> u64 {
    1000
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            seed: None,
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            pulse_ms: default_pulse_ms(),
        }
    }
}

impl ClassifierConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl AvatarConfig {
    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }
}

impl TomlConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level '{}' (expected one of: {})",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        if self.events.capacity == 0 {
            return Err(Error::Config(
                "events.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pick the config file path following the resolution priority
///
/// Returns `None` when no explicit path is given and no file exists in the
/// platform config directory.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    dirs::config_dir()
        .map(|dir| dir.join("emo-mirror").join("config.toml"))
        .filter(|path| path.exists())
}

/// Resolve and load configuration, falling back to defaults
///
/// A missing file is not an error: it is logged and defaults are used. A file
/// that exists but fails to parse or validate is an [`Error::Config`].
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = resolve_config_path(cli_arg) else {
        info!("No config file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} does not exist, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    info!("Loading config from {}", path.display());
    TomlConfig::load(&path)
}
