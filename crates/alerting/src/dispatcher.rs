//! Alert Dispatcher Implementation

use crate::audio::{AudioCue, AudioSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Alert dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Display time of simple alerts (ms)
    pub simple_hide_ms: u64,
    /// Display time of adaptive alerts (ms)
    pub adaptive_hide_ms: u64,
    /// Adaptive alert messages, indexed by alert level
    pub adaptive_messages: [String; 3],
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            simple_hide_ms: 3000,
            adaptive_hide_ms: 5000,
            adaptive_messages: [
                "Gentle reminder: Try to maintain focus on your studies.".to_string(),
                "You're getting distracted frequently. Let's refocus.".to_string(),
                "Important: Your focus is dropping significantly. Consider taking a short break."
                    .to_string(),
            ],
        }
    }
}

/// Escalation level of adaptive alerts, always within [1, 3]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct AlertLevel(u8);

impl AlertLevel {
    pub const MIN: AlertLevel = AlertLevel(1);
    pub const MAX: AlertLevel = AlertLevel(3);

    /// Create a level, clamping into [1, 3]
    pub fn new(level: u8) -> Self {
        Self(level.clamp(Self::MIN.0, Self::MAX.0))
    }

    /// Next level up, saturating at 3
    pub fn escalate(self) -> Self {
        Self::new(self.0 + 1)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Index into the three-entry message table
    fn table_index(self) -> usize {
        (self.0 as usize - 1).min(2)
    }
}

impl From<u8> for AlertLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl From<AlertLevel> for u8 {
    fn from(level: AlertLevel) -> Self {
        level.0
    }
}

impl Default for AlertLevel {
    fn default() -> Self {
        Self::MIN
    }
}

/// Display severity of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Notice,
    Warning,
    Critical,
}

impl AlertSeverity {
    /// Style classes for the alert box
    pub fn style_class(&self) -> &'static str {
        match self {
            AlertSeverity::Notice => "alert-box",
            AlertSeverity::Warning => "alert-box warning",
            AlertSeverity::Critical => "alert-box warning alert",
        }
    }

    fn for_level(level: AlertLevel) -> Self {
        match level.get() {
            1 => AlertSeverity::Notice,
            2 => AlertSeverity::Warning,
            _ => AlertSeverity::Critical,
        }
    }
}

/// Alert requested by the trackers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Alert {
    /// Fixed message, optional audio cue
    Simple { message: String, audio: bool },
    /// Message chosen from the severity table by level
    Adaptive { level: AlertLevel },
}

impl Alert {
    /// Simple alert with an audio cue
    pub fn audible(message: impl Into<String>) -> Self {
        Alert::Simple {
            message: message.into(),
            audio: true,
        }
    }

    /// Simple alert without audio
    pub fn silent(message: impl Into<String>) -> Self {
        Alert::Simple {
            message: message.into(),
            audio: false,
        }
    }

    /// Metric label for the alert kind
    pub fn kind(&self) -> &'static str {
        match self {
            Alert::Simple { .. } => "simple",
            Alert::Adaptive { .. } => "adaptive",
        }
    }
}

/// What the display should show for a dispatched alert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShownAlert {
    pub message: String,
    pub severity: AlertSeverity,
    /// Auto-hide delay (ms)
    pub hide_after_ms: u64,
    /// Whether the audio cue was requested
    pub audio_requested: bool,
    /// Whether the audio cue actually started
    pub audio_played: bool,
}

/// Currently displayed alert
#[derive(Debug, Clone)]
struct ActiveAlert {
    stop_cue_on_hide: bool,
}

/// Alert dispatcher: message selection, styling and audio
pub struct AlertDispatcher<A: AudioSink> {
    config: AlertConfig,
    cue: AudioCue<A>,
    active: Option<ActiveAlert>,
    dispatched: usize,
}

impl<A: AudioSink> AlertDispatcher<A> {
    /// Create a new dispatcher
    pub fn new(config: AlertConfig, sink: A) -> Self {
        info!("Creating alert dispatcher with config: {:?}", config);
        Self {
            config,
            cue: AudioCue::new(sink),
            active: None,
            dispatched: 0,
        }
    }

    /// Show an alert, replacing any alert currently displayed
    pub fn dispatch(&mut self, alert: &Alert) -> ShownAlert {
        let (message, severity, hide_after_ms, audio_requested, stop_cue_on_hide) = match alert {
            Alert::Simple { message, audio } => (
                message.clone(),
                AlertSeverity::Warning,
                self.config.simple_hide_ms,
                *audio,
                *audio,
            ),
            Alert::Adaptive { level } => (
                self.config.adaptive_messages[level.table_index()].clone(),
                AlertSeverity::for_level(*level),
                self.config.adaptive_hide_ms,
                *level >= AlertLevel::new(2),
                true,
            ),
        };

        info!("Alert ({}): {}", severity.style_class(), message);

        let audio_played = audio_requested && self.cue.play();

        // A cue still running from the replaced alert must stop with this one
        let inherited = self.active.as_ref().is_some_and(|a| a.stop_cue_on_hide);
        self.active = Some(ActiveAlert {
            stop_cue_on_hide: stop_cue_on_hide || inherited,
        });
        self.dispatched += 1;

        ShownAlert {
            message,
            severity,
            hide_after_ms,
            audio_requested,
            audio_played,
        }
    }

    /// Hide the active alert. Returns false when nothing was shown.
    pub fn hide(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                if active.stop_cue_on_hide {
                    self.cue.stop();
                }
                debug!("Alert hidden");
                true
            }
            None => false,
        }
    }

    /// Whether an alert is currently displayed
    pub fn is_showing(&self) -> bool {
        self.active.is_some()
    }

    /// Number of alerts dispatched this session
    pub fn dispatched_count(&self) -> usize {
        self.dispatched
    }

    pub fn cue(&mut self) -> &mut AudioCue<A> {
        &mut self.cue
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }
}
