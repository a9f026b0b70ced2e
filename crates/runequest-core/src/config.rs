//! Configuration loading and typed config structures for the RuneQuest engine.
//!
//! The canonical configuration lives in `runequest-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty document is a valid configuration.

use std::path::{Path, PathBuf};

use runequest_player::CombatConfig;
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

    /// The configuration parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `runequest-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// World name and random seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Timer periods.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Skilling action durations and rewards.
    #[serde(default)]
    pub actions: ActionConfig,

    /// Combat rewards and enemy parameters.
    #[serde(default)]
    pub combat: CombatConfig,

    /// Session parameters for the runner.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject zero periods and inverted ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("timing.action_step_ms", self.timing.action_step_ms),
            ("timing.combat_tick_ms", self.timing.combat_tick_ms),
            ("timing.respawn_delay_ms", self.timing.respawn_delay_ms),
            ("timing.autosave_interval_ms", self.timing.autosave_interval_ms),
            ("timing.chat_poll_interval_ms", self.timing.chat_poll_interval_ms),
            ("timing.frame_interval_ms", self.timing.frame_interval_ms),
            ("actions.woodcutting_ms", self.actions.woodcutting_ms),
            ("actions.mining_ms", self.actions.mining_ms),
            ("actions.smithing_ms", self.actions.smithing_ms),
            ("actions.travel_ms", self.actions.travel_ms),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid {
                reason: format!("{name} must be greater than zero"),
            });
        }
        if let Some(reason) = self.combat.check() {
            return Err(ConfigError::Invalid { reason });
        }
        if self.session.username.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: String::from("session.username must not be empty"),
            });
        }
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable world name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for combat rolls and respawn placement. Unset means a
    /// fresh seed per session.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl WorldConfig {
    /// The pinned seed, or a random one when none is configured.
    pub fn session_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: None,
        }
    }
}

/// Timer periods, all in milliseconds of virtual time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Action progress step (default: 100).
    #[serde(default = "default_action_step_ms")]
    pub action_step_ms: u64,

    /// Combat tick period (default: 2400).
    #[serde(default = "default_combat_tick_ms")]
    pub combat_tick_ms: u64,

    /// Delay between harvest and respawn (default: 10000).
    #[serde(default = "default_respawn_delay_ms")]
    pub respawn_delay_ms: u64,

    /// Autosave period (default: 30000).
    #[serde(default = "default_autosave_interval_ms")]
    pub autosave_interval_ms: u64,

    /// Chat poll period (default: 5000).
    #[serde(default = "default_chat_poll_interval_ms")]
    pub chat_poll_interval_ms: u64,

    /// Real-time frame period of the session runner (default: 100).
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            action_step_ms: default_action_step_ms(),
            combat_tick_ms: default_combat_tick_ms(),
            respawn_delay_ms: default_respawn_delay_ms(),
            autosave_interval_ms: default_autosave_interval_ms(),
            chat_poll_interval_ms: default_chat_poll_interval_ms(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

/// Skilling action durations (milliseconds) and experience rewards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionConfig {
    /// Woodcutting duration (default: 3000).
    #[serde(default = "default_woodcutting_ms")]
    pub woodcutting_ms: u64,

    /// Mining duration (default: 4000).
    #[serde(default = "default_mining_ms")]
    pub mining_ms: u64,

    /// Smelting duration (default: 5000).
    #[serde(default = "default_smithing_ms")]
    pub smithing_ms: u64,

    /// Travel duration (default: 2000).
    #[serde(default = "default_travel_ms")]
    pub travel_ms: u64,

    /// Woodcutting experience per log (default: 25).
    #[serde(default = "default_woodcutting_xp")]
    pub woodcutting_xp: u64,

    /// Mining experience per ore (default: 35).
    #[serde(default = "default_mining_xp")]
    pub mining_xp: u64,

    /// Smithing experience per bar (default: 50).
    #[serde(default = "default_smithing_xp")]
    pub smithing_xp: u64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            woodcutting_ms: default_woodcutting_ms(),
            mining_ms: default_mining_ms(),
            smithing_ms: default_smithing_ms(),
            travel_ms: default_travel_ms(),
            woodcutting_xp: default_woodcutting_xp(),
            mining_xp: default_mining_xp(),
            smithing_xp: default_smithing_xp(),
        }
    }
}

/// Session parameters for the async runner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Player name used for load, save, and chat (default: `Adventurer`).
    #[serde(default = "default_username")]
    pub username: String,

    /// Directory holding one JSON file per player (default: `data`).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Stop after this many real-time seconds; 0 runs until shutdown.
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// Number of chat messages fetched per poll (default: 50).
    #[serde(default = "default_chat_fetch_limit")]
    pub chat_fetch_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            data_dir: default_data_dir(),
            max_real_time_seconds: 0,
            chat_fetch_limit: default_chat_fetch_limit(),
        }
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (default: `info`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (default: pretty).
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("Lumbridge")
}

const fn default_action_step_ms() -> u64 {
    100
}

const fn default_combat_tick_ms() -> u64 {
    2_400
}

const fn default_respawn_delay_ms() -> u64 {
    10_000
}

const fn default_autosave_interval_ms() -> u64 {
    30_000
}

const fn default_chat_poll_interval_ms() -> u64 {
    5_000
}

const fn default_frame_interval_ms() -> u64 {
    100
}

const fn default_woodcutting_ms() -> u64 {
    3_000
}

const fn default_mining_ms() -> u64 {
    4_000
}

const fn default_smithing_ms() -> u64 {
    5_000
}

const fn default_travel_ms() -> u64 {
    2_000
}

const fn default_woodcutting_xp() -> u64 {
    25
}

const fn default_mining_xp() -> u64 {
    35
}

const fn default_smithing_xp() -> u64 {
    50
}

fn default_username() -> String {
    String::from("Adventurer")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

const fn default_chat_fetch_limit() -> usize {
    50
}

fn default_log_level() -> String {
    String::from("info")
}
