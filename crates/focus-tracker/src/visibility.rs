//! Tab visibility and session streak tracking

use crate::config::TrackerConfig;
use crate::state::SessionState;
use alerting::Alert;
use tracing::{debug, info};

/// Penalizes long absences from the session and refreshes the focus streak
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    config: TrackerConfig,
}

impl VisibilityTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    /// Score penalty for an absence of `away_ms`
    pub fn away_penalty(&self, away_ms: u64) -> u64 {
        ((away_ms / self.config.away_penalty_step_ms) * self.config.away_penalty_per_step)
            .min(self.config.away_penalty_cap)
    }

    /// Session view was hidden
    pub fn on_hidden(&self, state: &mut SessionState, now_ms: u64) {
        state.tab_visible = false;
        state.tab_hidden_ms = Some(now_ms);
        debug!("Session hidden at {}", now_ms);
    }

    /// Session view became visible again. Returns an alert when the absence
    /// exceeded the away threshold.
    pub fn on_visible(&self, state: &mut SessionState, now_ms: u64) -> Option<Alert> {
        state.tab_visible = true;
        let hidden_at = state.tab_hidden_ms.take()?;

        if !state.is_active() {
            return None;
        }

        let away_ms = now_ms.saturating_sub(hidden_at);
        if away_ms <= self.config.away_threshold_ms {
            debug!("Back after {}ms, under threshold", away_ms);
            return None;
        }

        let penalty = self.away_penalty(away_ms);
        state
            .focus_score
            .lower(u8::try_from(penalty).unwrap_or(u8::MAX));
        let missed = away_ms / self.config.away_threshold_ms;
        state.looking_away_count = state
            .looking_away_count
            .saturating_add(u32::try_from(missed).unwrap_or(u32::MAX));

        info!(
            "Away for {}ms: penalty {}, score {}, looking away {}",
            away_ms,
            penalty,
            state.focus_score.get(),
            state.looking_away_count
        );

        Some(Alert::silent(format!(
            "You were away for {} seconds. Stay focused!",
            away_ms / 1000
        )))
    }

    /// Recompute the focus streak. Returns the new streak in minutes, or
    /// `None` when the session clock has not started.
    pub fn refresh_streak(&self, state: &mut SessionState, now_ms: u64) -> Option<u64> {
        if !state.is_active() {
            return None;
        }
        let start = state.session_start_ms?;
        state.focus_streak_min = now_ms.saturating_sub(start) / 60_000;
        Some(state.focus_streak_min)
    }
}
