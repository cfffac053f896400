//! Behavior tracking: turns per-frame class probabilities into debounced events

use crate::config::TrackerConfig;
use crate::state::SessionState;
use alerting::Alert;
use classification_feed::Classification;
use tracing::{debug, info};

pub const SIT_UP_MESSAGE: &str = "Please sit up straight to maintain focus.";
pub const HEAD_UP_MESSAGE: &str = "Keep your head up and stay focused!";
pub const HAND_LEAN_MESSAGE: &str = "Please don't lean on your hand. Sit up straight!";

/// True when no previous event is recorded or the window has passed
fn cooled_down(last_ms: Option<u64>, now_ms: u64, window_ms: u64) -> bool {
    last_ms.map_or(true, |last| now_ms.saturating_sub(last) > window_ms)
}

/// Detects sustained leaning, head-down, hand-lean, look-away and raised hand
#[derive(Debug, Clone)]
pub struct BehaviorTracker {
    config: TrackerConfig,
}

impl BehaviorTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    /// Process one sampling tick. Returns the alerts to dispatch, in order.
    pub fn track(
        &self,
        state: &mut SessionState,
        classification: &Classification,
        now_ms: u64,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if !state.is_active() {
            return alerts;
        }

        let labels = &self.config.labels;
        let threshold = self.config.behavior_threshold;

        self.track_leaning(state, classification.probability_for(&labels.leaning), now_ms, &mut alerts);

        if classification.probability_for(&labels.looking_down) > threshold
            && cooled_down(state.recent_look_down_ms, now_ms, self.config.look_down_cooldown_ms)
        {
            debug!("Looking down detected");
            alerts.push(Alert::audible(HEAD_UP_MESSAGE));
            state.recent_look_down_ms = Some(now_ms);
        }

        if classification.probability_for(&labels.leaning_on_hand) > threshold
            && cooled_down(state.recent_lean_hand_ms, now_ms, self.config.lean_hand_cooldown_ms)
        {
            debug!("Leaning on hand detected");
            alerts.push(Alert::audible(HAND_LEAN_MESSAGE));
            state.recent_lean_hand_ms = Some(now_ms);
        }

        if classification.probability_for(&labels.looking_away) > threshold
            && cooled_down(state.recent_look_away_ms, now_ms, self.config.look_away_cooldown_ms)
        {
            state.looking_away_count += 1;
            state.recent_look_away_ms = Some(now_ms);
            debug!("Looking away counted ({})", state.looking_away_count);

            if state.looking_away_count % self.config.escalate_every_look_aways == 0 {
                state.alert_level = state.alert_level.escalate();
                info!("Alert level escalated to {}", state.alert_level.get());
                alerts.push(Alert::Adaptive {
                    level: state.alert_level,
                });
            }
        }

        self.track_raised_hand(state, classification.probability_for(&labels.raise_hand), now_ms);

        alerts
    }

    fn track_leaning(
        &self,
        state: &mut SessionState,
        probability: f32,
        now_ms: u64,
        alerts: &mut Vec<Alert>,
    ) {
        if probability <= self.config.behavior_threshold {
            state.leaning_start_ms = None;
            state.leaning_duration_secs = 0;
            return;
        }

        let Some(start) = state.leaning_start_ms else {
            state.leaning_start_ms = Some(now_ms);
            return;
        };

        state.leaning_duration_secs = now_ms.saturating_sub(start) / 1000;
        if state.leaning_duration_secs > self.config.leaning_alert_after_secs {
            let ready = match self.config.leaning_cooldown_ms {
                Some(window) => cooled_down(state.recent_leaning_alert_ms, now_ms, window),
                None => true,
            };
            if ready {
                debug!("Sustained leaning for {}s", state.leaning_duration_secs);
                alerts.push(Alert::audible(SIT_UP_MESSAGE));
                state.recent_leaning_alert_ms = Some(now_ms);
            }
        }
    }

    fn track_raised_hand(&self, state: &mut SessionState, probability: f32, now_ms: u64) {
        if probability <= self.config.gesture_threshold {
            state.raised_hand_start_ms = None;
            state.gesture_active = false;
            return;
        }

        match state.raised_hand_start_ms {
            None => state.raised_hand_start_ms = Some(now_ms),
            Some(start) if now_ms.saturating_sub(start) > self.config.gesture_hold_ms => {
                state.gesture_active = true;
            }
            Some(_) => {}
        }
    }
}
