//! Focus Tracker
//!
//! Turns noisy per-frame pose classifications into stable focus signals:
//! - Sustained behavior detection with cooldowns (leaning, head down, look-away)
//! - Debounced focus score with asymmetric confirmation
//! - Away penalties and focus streak
//! - Calibration window suppressing all of the above

pub mod behavior;
pub mod config;
pub mod scorer;
pub mod state;
pub mod visibility;

pub use behavior::BehaviorTracker;
pub use config::{BehaviorLabels, TrackerConfig};
pub use scorer::{FocusScorer, ScoreUpdate};
pub use state::{Calibration, FocusScore, SessionState};
pub use visibility::VisibilityTracker;

use alerting::{Alert, AlertLevel};
use classification_feed::Classification;
use thiserror::Error;
use tracing::info;

/// Focus tracker error types
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

/// Result of one sampling tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Alerts to dispatch, in detection order
    pub alerts: Vec<Alert>,
    pub score: ScoreUpdate,
}

/// Owns the session state and drives every tracker over it
pub struct FocusTracker {
    config: TrackerConfig,
    behavior: BehaviorTracker,
    scorer: FocusScorer,
    visibility: VisibilityTracker,
    state: SessionState,
}

impl FocusTracker {
    /// Create a tracker for a session created at `now_ms`
    pub fn new(config: TrackerConfig, now_ms: u64) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            behavior: BehaviorTracker::new(config.clone()),
            scorer: FocusScorer::new(config.clone()),
            visibility: VisibilityTracker::new(config.clone()),
            state: SessionState::new(now_ms),
            config,
        })
    }

    /// Enter the calibration window. Returns its length, or `None` if the
    /// session was already started.
    pub fn start_calibration(&mut self, now_ms: u64) -> Option<u64> {
        if !self.state.begin_calibration(now_ms, self.config.calibration_ms) {
            return None;
        }
        info!("Calibrating for {}ms", self.config.calibration_ms);
        Some(self.config.calibration_ms)
    }

    /// Leave calibration and start the session clock
    pub fn finish_calibration(&mut self, now_ms: u64) -> bool {
        let finished = self.state.finish_calibration(now_ms);
        if finished {
            info!("Calibration complete, session started");
        }
        finished
    }

    /// Run behavior tracking then scoring for one classification
    pub fn process(&mut self, classification: &Classification, now_ms: u64) -> TickOutcome {
        let alerts = self.behavior.track(&mut self.state, classification, now_ms);
        let score = self.scorer.update(&mut self.state, classification, now_ms);
        TickOutcome { alerts, score }
    }

    /// Apply a visibility transition
    pub fn on_visibility(&mut self, visible: bool, now_ms: u64) -> Option<Alert> {
        if visible {
            self.visibility.on_visible(&mut self.state, now_ms)
        } else {
            self.visibility.on_hidden(&mut self.state, now_ms);
            None
        }
    }

    /// Periodic streak refresh
    pub fn refresh_streak(&mut self, now_ms: u64) -> Option<u64> {
        self.visibility.refresh_streak(&mut self.state, now_ms)
    }

    /// External reset of the escalation level
    pub fn reset_alert_level(&mut self) {
        self.state.alert_level = AlertLevel::MIN;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}
