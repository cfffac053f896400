//! Alerting System
//!
//! Maps tracked behaviors to user-visible alerts:
//! - Simple alerts with an optional audio cue
//! - Adaptive alerts escalating through a three-level severity table
//! - Audio cue unlocking and graceful degradation to silent alerts

mod audio;
mod dispatcher;

pub use audio::{AudioCue, AudioError, AudioSink, NullAudio, TerminalBell};
pub use dispatcher::{Alert, AlertConfig, AlertDispatcher, AlertLevel, AlertSeverity, ShownAlert};
