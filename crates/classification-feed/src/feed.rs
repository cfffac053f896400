//! Classifier feeds

use crate::{Classification, FeedError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Source of per-tick classification results
///
/// `load` brings up the camera and model; its failure is fatal for the session.
/// `classify` is called once per sampling tick.
#[allow(async_fn_in_trait)]
pub trait ClassificationFeed {
    /// Initialize the underlying camera and model
    async fn load(&mut self) -> Result<(), FeedError>;

    /// Produce the classification for the current frame
    async fn classify(&mut self) -> Result<Classification, FeedError>;

    /// Number of classes in the model vocabulary
    fn class_count(&self) -> usize;
}

/// A scripted classifier frame, repeated `repeat` times
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedFrame {
    /// (label, probability) pairs in classifier order
    #[serde(default)]
    pub classes: Vec<(String, f32)>,
    /// Number of consecutive ticks this frame is returned
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// No classification for these ticks (`classes` is ignored)
    #[serde(default)]
    pub unavailable: bool,
}

fn default_repeat() -> u32 {
    1
}

impl ScriptedFrame {
    pub fn new(classes: Vec<(String, f32)>, repeat: u32) -> Self {
        Self {
            classes,
            repeat,
            unavailable: false,
        }
    }

    /// Ticks on which the classifier has nothing to report
    pub fn unavailable(repeat: u32) -> Self {
        Self {
            classes: Vec::new(),
            repeat,
            unavailable: true,
        }
    }
}

/// Feed that replays a fixed list of frames (stand-in for the real model)
pub struct ScriptedFeed {
    /// `None` marks ticks without a classification
    frames: Vec<(Option<Classification>, u32)>,
    /// Current frame index
    cursor: usize,
    /// Ticks already served from the current frame
    served: u32,
    loaded: bool,
    load_failure: Option<String>,
}

impl ScriptedFeed {
    /// Create a scripted feed, validating every frame up front
    pub fn new(frames: Vec<ScriptedFrame>) -> Result<Self, FeedError> {
        let frames = frames
            .into_iter()
            .map(|f| -> Result<(Option<Classification>, u32), FeedError> {
                if f.unavailable {
                    return Ok((None, f.repeat));
                }
                Ok((Some(Classification::new(f.classes)?), f.repeat))
            })
            .collect::<Result<Vec<_>, FeedError>>()?;

        info!("Scripted feed created with {} frames", frames.len());

        Ok(Self {
            frames,
            cursor: 0,
            served: 0,
            loaded: false,
            load_failure: None,
        })
    }

    /// Parse frames from a JSON array
    pub fn from_json(json: &str) -> Result<Self, FeedError> {
        let frames: Vec<ScriptedFrame> = serde_json::from_str(json)
            .map_err(|e| FeedError::Initialization(format!("invalid script: {}", e)))?;
        Self::new(frames)
    }

    /// Make `load` fail, simulating an unavailable camera or model
    pub fn with_load_failure(mut self, reason: impl Into<String>) -> Self {
        self.load_failure = Some(reason.into());
        self
    }

    /// Ticks left before the feed is exhausted
    pub fn remaining(&self) -> u64 {
        let mut left: u64 = self.frames[self.cursor.min(self.frames.len())..]
            .iter()
            .map(|(_, repeat)| *repeat as u64)
            .sum();
        if self.cursor < self.frames.len() {
            left -= self.served as u64;
        }
        left
    }
}

impl ClassificationFeed for ScriptedFeed {
    async fn load(&mut self) -> Result<(), FeedError> {
        if let Some(reason) = &self.load_failure {
            warn!("Scripted feed load failed: {}", reason);
            return Err(FeedError::Initialization(reason.clone()));
        }
        debug!("Scripted feed loaded");
        self.loaded = true;
        Ok(())
    }

    async fn classify(&mut self) -> Result<Classification, FeedError> {
        if !self.loaded {
            return Err(FeedError::NotLoaded);
        }

        while let Some((classification, repeat)) = self.frames.get(self.cursor) {
            if self.served < *repeat {
                self.served += 1;
                return classification.clone().ok_or(FeedError::Unavailable);
            }
            self.cursor += 1;
            self.served = 0;
        }

        Err(FeedError::Exhausted)
    }

    fn class_count(&self) -> usize {
        self.frames
            .iter()
            .find_map(|(c, _)| c.as_ref().map(Classification::len))
            .unwrap_or(0)
    }
}
