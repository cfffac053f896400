//! Focus tracker configuration

use crate::TrackerError;
use serde::{Deserialize, Serialize};

/// Class names the tracker looks up in classifier output (substring, case-insensitive)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorLabels {
    pub leaning: String,
    pub looking_down: String,
    pub leaning_on_hand: String,
    pub looking_away: String,
    pub raise_hand: String,
}

impl Default for BehaviorLabels {
    fn default() -> Self {
        Self {
            leaning: "leaning".to_string(),
            looking_down: "looking down".to_string(),
            leaning_on_hand: "leaning on hand".to_string(),
            looking_away: "looking away".to_string(),
            raise_hand: "raise hand".to_string(),
        }
    }
}

/// Focus tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Probability above which a posture behavior is detected
    pub behavior_threshold: f32,

    /// Probability above which the raised-hand gesture is detected
    pub gesture_threshold: f32,

    /// Leaning longer than this (whole seconds) raises the sit-up alert
    pub leaning_alert_after_secs: u64,

    /// Minimum time between sit-up alerts (ms). `None` repeats the alert every tick.
    pub leaning_cooldown_ms: Option<u64>,

    /// Cooldown between looking-down alerts (ms)
    pub look_down_cooldown_ms: u64,

    /// Cooldown between leaning-on-hand alerts (ms)
    pub lean_hand_cooldown_ms: u64,

    /// Cooldown between counted look-aways (ms)
    pub look_away_cooldown_ms: u64,

    /// Escalate the alert level every N look-aways
    pub escalate_every_look_aways: u32,

    /// Raised hand must be held this long before the gesture cue shows (ms)
    pub gesture_hold_ms: u64,

    /// Minimum time between focus score evaluations (ms)
    pub score_interval_ms: u64,

    /// Unchanged top-label evaluations needed before a label counts as stable
    pub stability_ticks: u32,

    /// Confirmed focused evaluations per score increase
    pub focused_confirmations: u32,

    /// Score increase after focused confirmation
    pub focused_reward: u8,

    /// Confirmed distracted evaluations per score decrease
    pub distracted_confirmations: u32,

    /// Score decrease after distracted confirmation
    pub distracted_penalty: u8,

    /// Labels never counted as distraction
    pub safe_labels: Vec<String>,

    /// Labels that earn focus confirmations
    pub positive_labels: Vec<String>,

    /// Tab hidden longer than this is penalized (ms)
    pub away_threshold_ms: u64,

    /// Away penalty grows by `away_penalty_per_step` every step (ms)
    pub away_penalty_step_ms: u64,
    pub away_penalty_per_step: u64,

    /// Upper bound of a single away penalty
    pub away_penalty_cap: u64,

    /// Calibration window after session start (ms)
    pub calibration_ms: u64,

    /// Focus streak refresh period (ms)
    pub streak_tick_ms: u64,

    pub labels: BehaviorLabels,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let focus_labels = vec![
            "focused".to_string(),
            "raise hand".to_string(),
            "raised hand".to_string(),
            "default".to_string(),
        ];

        Self {
            behavior_threshold: 0.70,
            gesture_threshold: 0.90,
            leaning_alert_after_secs: 8,
            leaning_cooldown_ms: None,
            look_down_cooldown_ms: 8000,
            lean_hand_cooldown_ms: 8000,
            look_away_cooldown_ms: 5000,
            escalate_every_look_aways: 3,
            gesture_hold_ms: 1000,
            score_interval_ms: 500,
            stability_ticks: 2,
            focused_confirmations: 3,
            focused_reward: 2,
            distracted_confirmations: 5,
            distracted_penalty: 3,
            safe_labels: focus_labels.clone(),
            positive_labels: focus_labels,
            away_threshold_ms: 30_000,
            away_penalty_step_ms: 10_000,
            away_penalty_per_step: 2,
            away_penalty_cap: 20,
            calibration_ms: 10_000,
            streak_tick_ms: 2000,
            labels: BehaviorLabels::default(),
        }
    }
}

impl TrackerConfig {
    /// Config with an 8 s cooldown on the sit-up alert, like its sibling alerts
    pub fn with_leaning_cooldown() -> Self {
        Self {
            leaning_cooldown_ms: Some(8000),
            ..Default::default()
        }
    }

    /// Check that thresholds and counters are usable
    pub fn validate(&self) -> Result<(), TrackerError> {
        for (name, value) in [
            ("behavior_threshold", self.behavior_threshold),
            ("gesture_threshold", self.gesture_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TrackerError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("escalate_every_look_aways", self.escalate_every_look_aways as u64),
            ("focused_confirmations", self.focused_confirmations as u64),
            ("distracted_confirmations", self.distracted_confirmations as u64),
            ("away_threshold_ms", self.away_threshold_ms),
            ("away_penalty_step_ms", self.away_penalty_step_ms),
            ("streak_tick_ms", self.streak_tick_ms),
        ] {
            if value == 0 {
                return Err(TrackerError::InvalidConfig(format!("{} must be > 0", name)));
            }
        }

        Ok(())
    }
}
