//! Session controller
//!
//! Owns the tracker state, alert dispatcher, timer queue and display, and is
//! the only writer of session state. Every entry point takes the current
//! session time in milliseconds.

use crate::config::MonitorConfig;
use crate::display::{DisplayError, FocusDisplay};
use crate::runner::HostEvent;
use crate::MonitorError;
use alerting::{Alert, AlertDispatcher, AudioSink};
use chrono::{DateTime, Utc};
use classification_feed::Classification;
use focus_tracker::{Calibration, FocusTracker, ScoreUpdate, SessionState};
use serde::Serialize;
use timer_queue::{TimerHandle, TimerQueue};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const AUDIO_WARNING: &str =
    "Audio alerts may not work. Interact with the session to enable sound.";
pub const INIT_FAILURE: &str =
    "Failed to initialize the focus monitor. Please check your camera permissions.";

/// Deferred work handled by the timer queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    CalibrationEnd,
    StreakTick,
    HideAlert,
}

/// End-of-session report (kept in memory, printed on exit)
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: Option<DateTime<Utc>>,
    pub calibrating: bool,
    pub focus_score: u8,
    pub looking_away_count: u32,
    pub focus_streak_min: u64,
    pub alert_level: u8,
    pub alerts_fired: usize,
}

/// Focus monitoring session
pub struct FocusMonitor<D: FocusDisplay, A: AudioSink> {
    tracker: FocusTracker,
    dispatcher: AlertDispatcher<A>,
    timers: TimerQueue<TimerEvent>,
    display: D,
    /// Auto-hide timer of the alert on screen
    hide_timer: Option<TimerHandle>,
    streak_interval_ms: u64,
    session_id: Uuid,
    started_at: Option<DateTime<Utc>>,
}

impl<D: FocusDisplay, A: AudioSink> FocusMonitor<D, A> {
    /// Create a monitor for a session created at `now_ms`
    pub fn new(config: &MonitorConfig, display: D, sink: A, now_ms: u64) -> Result<Self, MonitorError> {
        let session_id = Uuid::new_v4();
        info!("Creating focus monitor, session {}", session_id);

        Ok(Self {
            tracker: FocusTracker::new(config.tracker.clone(), now_ms)?,
            dispatcher: AlertDispatcher::new(config.alerts.clone(), sink),
            timers: TimerQueue::new(),
            display,
            hide_timer: None,
            streak_interval_ms: config.tracker.streak_tick_ms,
            session_id,
            started_at: None,
        })
    }

    /// Apply a display update, skipping it when the display rejects it
    fn render<F>(&mut self, update: F)
    where
        F: FnOnce(&mut D) -> Result<(), DisplayError>,
    {
        if let Err(e) = update(&mut self.display) {
            warn!("Skipping display update: {}", e);
        }
    }

    /// Try to unlock audio before the session starts. Returns whether sound
    /// is available; on failure the user is told to interact with the session.
    pub fn initialize(&mut self) -> bool {
        let unlocked = self.dispatcher.cue().unlock();
        if !unlocked {
            self.render(|d| d.notice(AUDIO_WARNING));
        }
        unlocked
    }

    /// Surface a notice to the user
    pub fn notify(&mut self, message: &str) {
        self.render(|d| d.notice(message));
    }

    /// Start the session: enter calibration and schedule the session timers.
    /// Returns false if already started.
    pub fn start(&mut self, now_ms: u64) -> bool {
        let Some(calibration_ms) = self.tracker.start_calibration(now_ms) else {
            warn!("Session already started");
            return false;
        };

        self.render(|d| d.show_calibration(true));
        self.timers
            .schedule_once(now_ms, calibration_ms, TimerEvent::CalibrationEnd);
        self.timers
            .schedule_every(now_ms, self.streak_interval_ms, TimerEvent::StreakTick);
        self.started_at = Some(Utc::now());
        true
    }

    /// Process one sampling tick
    pub fn on_classification(&mut self, classification: &Classification, now_ms: u64) {
        if self.tracker.state().calibration == Calibration::Idle {
            debug!("Classification before session start ignored");
            return;
        }

        let top_index = classification.top_index();
        self.render(|d| d.show_classes(classification, top_index));

        if !self.tracker.state().is_active() {
            return;
        }

        let outcome = self.tracker.process(classification, now_ms);
        for alert in &outcome.alerts {
            self.raise_alert(alert, now_ms);
        }

        let state = self.tracker.state();
        let gesture = state.gesture_active;
        let leaning = state.leaning_display();
        let looking_away = state.looking_away_count;
        let score = state.focus_score.get();

        self.render(|d| d.show_gesture(gesture));
        self.render(|d| d.show_leaning(&leaning));
        self.render(|d| d.show_looking_away(looking_away));

        if outcome.score != ScoreUpdate::Skipped {
            self.render(|d| d.show_score(score));
            metrics::gauge!("focus_score").set(score as f64);
        }
        metrics::gauge!("focus_looking_away").set(looking_away as f64);
    }

    /// Session view shown or hidden by the host
    pub fn on_visibility_change(&mut self, visible: bool, now_ms: u64) {
        let Some(alert) = self.tracker.on_visibility(visible, now_ms) else {
            return;
        };

        let state = self.tracker.state();
        let score = state.focus_score.get();
        let looking_away = state.looking_away_count;
        self.render(|d| d.show_score(score));
        self.render(|d| d.show_looking_away(looking_away));
        self.raise_alert(&alert, now_ms);
    }

    /// First user interaction unlocks audio; later ones are ignored
    pub fn on_user_interaction(&mut self) -> Option<bool> {
        self.dispatcher.cue().on_user_interaction()
    }

    /// Dispatch an event delivered by the hosting environment
    pub fn on_host_event(&mut self, event: HostEvent, now_ms: u64) {
        match event {
            HostEvent::Hidden => self.on_visibility_change(false, now_ms),
            HostEvent::Visible => self.on_visibility_change(true, now_ms),
            HostEvent::Interaction => {
                self.on_user_interaction();
            }
        }
    }

    /// Fire every timer due at `now_ms`
    pub fn poll_timers(&mut self, now_ms: u64) {
        while let Some(event) = self.timers.pop_due(now_ms) {
            match event {
                TimerEvent::CalibrationEnd => {
                    if self.tracker.finish_calibration(now_ms) {
                        self.render(|d| d.show_calibration(false));
                    }
                }
                TimerEvent::StreakTick => {
                    if let Some(minutes) = self.tracker.refresh_streak(now_ms) {
                        self.render(|d| d.show_streak(minutes));
                    }
                }
                TimerEvent::HideAlert => {
                    self.hide_timer = None;
                    self.dispatcher.hide();
                    self.render(|d| d.hide_alert());
                }
            }
        }
    }

    fn raise_alert(&mut self, alert: &Alert, now_ms: u64) {
        let shown = self.dispatcher.dispatch(alert);
        self.render(|d| d.show_alert(&shown));

        // The previous alert's timer must not hide this one
        if let Some(handle) = self.hide_timer.take() {
            self.timers.cancel(handle);
        }
        self.hide_timer = Some(
            self.timers
                .schedule_once(now_ms, shown.hide_after_ms, TimerEvent::HideAlert),
        );

        metrics::counter!("focus_alerts_total", "kind" => alert.kind()).increment(1);
    }

    /// Earliest pending timer deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn state(&self) -> &SessionState {
        self.tracker.state()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn is_alert_showing(&self) -> bool {
        self.dispatcher.is_showing()
    }

    pub fn summary(&self) -> SessionSummary {
        let state = self.tracker.state();
        SessionSummary {
            session_id: self.session_id,
            started_at: self.started_at,
            calibrating: state.is_calibrating(),
            focus_score: state.focus_score.get(),
            looking_away_count: state.looking_away_count,
            focus_streak_min: state.focus_streak_min,
            alert_level: state.alert_level.get(),
            alerts_fired: self.dispatcher.dispatched_count(),
        }
    }
}
