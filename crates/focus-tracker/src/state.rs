//! Session state tracking

use alerting::AlertLevel;
use serde::{Deserialize, Serialize};

/// Focus score, always within [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FocusScore(u8);

impl FocusScore {
    pub const MAX: u8 = 100;

    /// Create a score, clamping to 100
    pub fn new(score: u8) -> Self {
        Self(score.min(Self::MAX))
    }

    /// Increase, saturating at 100
    pub fn raise(&mut self, amount: u8) {
        self.0 = self.0.saturating_add(amount).min(Self::MAX);
    }

    /// Decrease, saturating at 0
    pub fn lower(&mut self, amount: u8) {
        self.0 = self.0.saturating_sub(amount);
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for FocusScore {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

/// Calibration phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Calibration {
    /// Session not started
    #[default]
    Idle,
    /// Settling window; nothing is tracked
    Calibrating { ends_at_ms: u64 },
    /// Tracking; entered once and never left
    Active { since_ms: u64 },
}

/// State of one monitoring session
///
/// Timestamps are milliseconds from the session clock.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    pub focus_score: FocusScore,
    pub alert_level: AlertLevel,
    pub calibration: Calibration,

    /// Set when calibration ends
    pub session_start_ms: Option<u64>,
    /// Whole minutes since session start
    pub focus_streak_min: u64,

    pub looking_away_count: u32,

    pub leaning_start_ms: Option<u64>,
    /// Whole seconds of the current leaning episode
    pub leaning_duration_secs: u64,

    pub raised_hand_start_ms: Option<u64>,
    /// Gesture cue currently shown
    pub gesture_active: bool,

    // Last alert times, gating repeats
    pub recent_leaning_alert_ms: Option<u64>,
    pub recent_look_down_ms: Option<u64>,
    pub recent_lean_hand_ms: Option<u64>,
    pub recent_look_away_ms: Option<u64>,

    /// Top label of the previous score evaluation (lowercase)
    pub last_label: String,
    /// Consecutive evaluations with an unchanged top label
    pub stability_counter: u32,
    pub consecutive_focused: u32,
    pub consecutive_distracted: u32,
    /// Time of the last score evaluation
    pub last_focus_check_ms: u64,

    pub tab_visible: bool,
    pub tab_hidden_ms: Option<u64>,
}

impl SessionState {
    /// Fresh state for a session created at `now_ms`
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_focus_check_ms: now_ms,
            tab_visible: true,
            ..Default::default()
        }
    }

    pub fn is_calibrating(&self) -> bool {
        matches!(self.calibration, Calibration::Calibrating { .. })
    }

    /// Whether behaviors and score are being tracked
    pub fn is_active(&self) -> bool {
        matches!(self.calibration, Calibration::Active { .. })
    }

    /// Enter calibration. Returns false if the session was already started.
    pub fn begin_calibration(&mut self, now_ms: u64, duration_ms: u64) -> bool {
        if self.calibration != Calibration::Idle {
            return false;
        }
        self.calibration = Calibration::Calibrating {
            ends_at_ms: now_ms.saturating_add(duration_ms),
        };
        true
    }

    /// Leave calibration and start the session clock.
    /// Returns false unless the session was calibrating.
    pub fn finish_calibration(&mut self, now_ms: u64) -> bool {
        if !self.is_calibrating() {
            return false;
        }
        self.calibration = Calibration::Active { since_ms: now_ms };
        self.session_start_ms = Some(now_ms);
        true
    }

    /// Leaning duration as displayed ("Ns")
    pub fn leaning_display(&self) -> String {
        format!("{}s", self.leaning_duration_secs)
    }
}
