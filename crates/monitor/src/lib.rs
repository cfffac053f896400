//! Focus Monitor
//!
//! Session controller tying the pieces together:
//! - Classification feed sampling loop
//! - Behavior tracking and focus scoring
//! - Alert dispatch with auto-hide timers
//! - Display and audio collaborators

pub mod config;
pub mod display;
pub mod monitor;
pub mod runner;

pub use config::{AudioMode, FeedConfig, LogConfig, LogFormat, MonitorConfig};
pub use display::{DisplayError, FocusDisplay, LogDisplay};
pub use monitor::{FocusMonitor, SessionSummary, TimerEvent};
pub use runner::{run_session, spawn_host_events, HostEvent, ScriptedEvent, SessionClock, SessionScript};

use classification_feed::FeedError;
use focus_tracker::TrackerError;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Camera or model unavailable; the session cannot start
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Initialize logging
pub fn init_logging(config: &LogConfig) -> Result<(), MonitorError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| MonitorError::Logging(format!("unknown log level '{}'", config.level)))?;

    let result = match config.format {
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(true)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    result.map_err(|e| MonitorError::Logging(e.to_string()))
}
