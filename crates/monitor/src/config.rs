//! Monitor configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional file
//! (`focus-monitor.{toml,json,yaml}` in the working directory, or an explicit
//! path), then `FOCUS__SECTION__KEY` environment variables.

use crate::MonitorError;
use alerting::AlertConfig;
use config::{Config, Environment, File};
use focus_tracker::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum level ("trace" to "error")
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Audio output for alert cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioMode {
    /// Terminal bell on stderr
    #[default]
    Bell,
    /// No sound
    Silent,
}

/// Sampling loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Time between sampling ticks (ms), ~60 Hz by default
    pub sample_interval_ms: u64,
    /// Session script replayed by the scripted feed
    pub script_path: Option<PathBuf>,
    pub audio: AudioMode,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 16,
            script_path: None,
            audio: AudioMode::Bell,
        }
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub log: LogConfig,
    pub feed: FeedConfig,
    pub tracker: TrackerConfig,
    pub alerts: AlertConfig,
}

impl MonitorConfig {
    /// Load configuration. An explicit `path` must exist; without one, a
    /// `focus-monitor` file in the working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("focus-monitor").required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("FOCUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: MonitorConfig = settings.try_deserialize()?;
        config.tracker.validate()?;
        Ok(config)
    }
}
