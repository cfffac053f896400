//! Render collaborator
//!
//! The monitor pushes every user-facing update through `FocusDisplay`. A
//! failed update is logged and skipped; it never interrupts tracking.

use alerting::ShownAlert;
use classification_feed::Classification;
use thiserror::Error;
use tracing::{info, trace, warn};

/// Display update errors
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The element to update does not exist
    #[error("Render target missing: {0}")]
    MissingTarget(&'static str),

    #[error("Render failed: {0}")]
    Render(String),
}

/// User-facing surface of a monitoring session
pub trait FocusDisplay {
    fn show_score(&mut self, score: u8) -> Result<(), DisplayError>;

    fn show_looking_away(&mut self, count: u32) -> Result<(), DisplayError>;

    /// Leaning duration, formatted as "Ns"
    fn show_leaning(&mut self, duration: &str) -> Result<(), DisplayError>;

    fn show_streak(&mut self, minutes: u64) -> Result<(), DisplayError>;

    fn show_alert(&mut self, alert: &ShownAlert) -> Result<(), DisplayError>;

    fn hide_alert(&mut self) -> Result<(), DisplayError>;

    /// Raised-hand gesture indicator
    fn show_gesture(&mut self, visible: bool) -> Result<(), DisplayError>;

    fn show_calibration(&mut self, visible: bool) -> Result<(), DisplayError>;

    /// Per-class probabilities with the most probable one highlighted
    fn show_classes(
        &mut self,
        classification: &Classification,
        top_index: usize,
    ) -> Result<(), DisplayError>;

    /// One-off notice (startup failures, degraded audio)
    fn notice(&mut self, message: &str) -> Result<(), DisplayError>;
}

/// Display rendering to the log, reporting only changes
#[derive(Debug, Default)]
pub struct LogDisplay {
    score: Option<u8>,
    looking_away: Option<u32>,
    leaning: String,
    streak: Option<u64>,
    gesture: bool,
    top_label: String,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FocusDisplay for LogDisplay {
    fn show_score(&mut self, score: u8) -> Result<(), DisplayError> {
        if self.score != Some(score) {
            info!(score, "Focus score");
            self.score = Some(score);
        }
        Ok(())
    }

    fn show_looking_away(&mut self, count: u32) -> Result<(), DisplayError> {
        if self.looking_away != Some(count) {
            info!(count, "Looking away");
            self.looking_away = Some(count);
        }
        Ok(())
    }

    fn show_leaning(&mut self, duration: &str) -> Result<(), DisplayError> {
        if self.leaning != duration {
            trace!(duration, "Leaning");
            self.leaning = duration.to_string();
        }
        Ok(())
    }

    fn show_streak(&mut self, minutes: u64) -> Result<(), DisplayError> {
        if self.streak != Some(minutes) {
            info!(minutes, "Focus streak");
            self.streak = Some(minutes);
        }
        Ok(())
    }

    fn show_alert(&mut self, alert: &ShownAlert) -> Result<(), DisplayError> {
        warn!(class = alert.severity.style_class(), "{}", alert.message);
        Ok(())
    }

    fn hide_alert(&mut self) -> Result<(), DisplayError> {
        trace!("Alert hidden");
        Ok(())
    }

    fn show_gesture(&mut self, visible: bool) -> Result<(), DisplayError> {
        if self.gesture != visible {
            info!(visible, "Gesture indicator");
            self.gesture = visible;
        }
        Ok(())
    }

    fn show_calibration(&mut self, visible: bool) -> Result<(), DisplayError> {
        if visible {
            info!("Calibrating... please sit naturally");
        } else {
            info!("Calibration finished");
        }
        Ok(())
    }

    fn show_classes(
        &mut self,
        classification: &Classification,
        top_index: usize,
    ) -> Result<(), DisplayError> {
        let top = &classification.classes()[top_index];
        if self.top_label != top.label {
            info!(
                label = %top.label,
                probability = %format!("{:.0}%", top.probability * 100.0),
                "Most probable class"
            );
            self.top_label = top.label.clone();
        }
        Ok(())
    }

    fn notice(&mut self, message: &str) -> Result<(), DisplayError> {
        warn!("{}", message);
        Ok(())
    }
}
