//! Debounced focus scoring
//!
//! A score change needs two confirmations: the top label must be stable for
//! `stability_ticks` evaluations, and then confirmed for `focused_confirmations`
//! (or `distracted_confirmations`) further stable evaluations. Evaluations are
//! rate-limited to one per `score_interval_ms`.

use crate::config::TrackerConfig;
use crate::state::SessionState;
use classification_feed::Classification;
use serde::Serialize;
use tracing::debug;

/// Outcome of a scorer evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreUpdate {
    /// Not evaluated (inactive session or rate limit)
    Skipped,
    /// Evaluated, no change
    Unchanged,
    Raised { score: u8 },
    Lowered { score: u8 },
}

impl ScoreUpdate {
    pub fn changed(&self) -> bool {
        matches!(self, ScoreUpdate::Raised { .. } | ScoreUpdate::Lowered { .. })
    }
}

/// Focus score smoother
#[derive(Debug, Clone)]
pub struct FocusScorer {
    config: TrackerConfig,
}

impl FocusScorer {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    fn matches_any(label: &str, candidates: &[String]) -> bool {
        candidates.iter().any(|c| label.contains(c.as_str()))
    }

    /// Evaluate the current classification
    pub fn update(
        &self,
        state: &mut SessionState,
        classification: &Classification,
        now_ms: u64,
    ) -> ScoreUpdate {
        if !state.is_active() {
            return ScoreUpdate::Skipped;
        }
        if now_ms.saturating_sub(state.last_focus_check_ms) < self.config.score_interval_ms {
            return ScoreUpdate::Skipped;
        }
        state.last_focus_check_ms = now_ms;

        let label = classification.top_scoring().label.to_lowercase();

        if label != state.last_label {
            state.stability_counter = 0;
        } else {
            state.stability_counter += 1;
        }
        let stable = state.stability_counter >= self.config.stability_ticks;

        let positive = Self::matches_any(&label, &self.config.positive_labels);
        let safe = Self::matches_any(&label, &self.config.safe_labels);
        state.last_label = label;

        if stable && positive {
            state.consecutive_focused += 1;
            if state.consecutive_focused >= self.config.focused_confirmations {
                state.focus_score.raise(self.config.focused_reward);
                state.consecutive_focused = 0;
                debug!("Focus confirmed, score {}", state.focus_score.get());
                return ScoreUpdate::Raised {
                    score: state.focus_score.get(),
                };
            }
        } else if stable && !safe {
            state.consecutive_distracted += 1;
            if state.consecutive_distracted >= self.config.distracted_confirmations {
                state.focus_score.lower(self.config.distracted_penalty);
                state.consecutive_distracted = 0;
                debug!(
                    "Distraction confirmed ({}), score {}",
                    state.last_label,
                    state.focus_score.get()
                );
                return ScoreUpdate::Lowered {
                    score: state.focus_score.get(),
                };
            }
        }

        ScoreUpdate::Unchanged
    }
}
