//! Audio cue playback
//!
//! Hosts may block playback until the user has interacted with the session.
//! `AudioCue` tracks whether the sink is unlocked and retries lazily; failures
//! never prevent the visual alert from showing.

use std::io::{IsTerminal, Write};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Audio playback errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    /// Host refused playback (e.g. no user interaction yet)
    #[error("Playback blocked: {0}")]
    Blocked(String),

    /// Playback started but failed
    #[error("Playback failed: {0}")]
    Playback(String),

    /// No audio resource available
    #[error("Audio resource unavailable")]
    Unavailable,
}

/// Audio output the alert cue is played through
pub trait AudioSink {
    /// Play and immediately stop the cue to unlock playback
    fn prime(&mut self) -> Result<(), AudioError>;

    /// Reload the audio resource (fallback unlock strategy)
    fn reload(&mut self) -> Result<(), AudioError>;

    /// Start the cue from the beginning
    fn play(&mut self) -> Result<(), AudioError>;

    /// Stop the cue and rewind it
    fn pause(&mut self);
}

/// Sink that accepts everything and plays nothing
#[derive(Debug, Clone, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn prime(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn reload(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn pause(&mut self) {}
}

/// Sink ringing the terminal bell on stderr
#[derive(Debug, Clone, Default)]
pub struct TerminalBell;

impl TerminalBell {
    fn check_terminal(&self) -> Result<(), AudioError> {
        if std::io::stderr().is_terminal() {
            Ok(())
        } else {
            Err(AudioError::Blocked("stderr is not a terminal".to_string()))
        }
    }
}

impl AudioSink for TerminalBell {
    fn prime(&mut self) -> Result<(), AudioError> {
        self.check_terminal()
    }

    fn reload(&mut self) -> Result<(), AudioError> {
        self.check_terminal()
    }

    fn play(&mut self) -> Result<(), AudioError> {
        let mut stderr = std::io::stderr();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| AudioError::Playback(e.to_string()))
    }

    fn pause(&mut self) {}
}

/// Unlock-aware controller around an audio sink
pub struct AudioCue<A: AudioSink> {
    sink: A,
    unlocked: bool,
    /// Set once the first user interaction has been handled
    interaction_handled: bool,
}

impl<A: AudioSink> AudioCue<A> {
    /// Create a locked cue
    pub fn new(sink: A) -> Self {
        Self {
            sink,
            unlocked: false,
            interaction_handled: false,
        }
    }

    /// Try to unlock playback: prime the sink, falling back to one reload.
    /// Returns whether playback is unlocked.
    pub fn unlock(&mut self) -> bool {
        if self.unlocked {
            debug!("Audio already unlocked");
            return true;
        }

        match self.sink.prime() {
            Ok(()) => {
                info!("Audio unlocked");
                self.unlocked = true;
            }
            Err(e) => {
                warn!("Audio unlock failed: {}", e);
                match self.sink.reload() {
                    Ok(()) => {
                        info!("Audio unlocked after reload");
                        self.unlocked = true;
                    }
                    Err(e) => warn!("Audio reload fallback failed: {}", e),
                }
            }
        }

        self.unlocked
    }

    /// Handle a user interaction. Only the first interaction attempts an unlock;
    /// later ones return `None`.
    pub fn on_user_interaction(&mut self) -> Option<bool> {
        if self.interaction_handled {
            return None;
        }
        self.interaction_handled = true;
        debug!("User interaction detected");
        Some(self.unlock())
    }

    /// Play the cue, unlocking lazily. Returns whether the cue started.
    pub fn play(&mut self) -> bool {
        if !self.unlocked {
            warn!("Audio not unlocked, attempting unlock now");
            if !self.unlock() {
                return false;
            }
        }

        match self.sink.play() {
            Ok(()) => {
                debug!("Audio cue playing");
                true
            }
            Err(e) => {
                warn!("Audio play failed: {}", e);
                self.unlocked = false;
                self.unlock();
                false
            }
        }
    }

    /// Stop and rewind the cue
    pub fn stop(&mut self) {
        self.sink.pause();
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut A {
        &mut self.sink
    }
}
