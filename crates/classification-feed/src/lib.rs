//! Classification Feed
//!
//! Boundary with the external pose classifier:
//! - Typed (label, probability) records
//! - One-time validation of classifier output
//! - Case-insensitive label lookup and top-class selection
//! - A scripted feed standing in for the real model

mod classification;
mod feed;
mod validator;

pub use classification::{ClassProbability, Classification};
pub use feed::{ClassificationFeed, ScriptedFeed, ScriptedFrame};
pub use validator::{ValidationError, Validator};

use thiserror::Error;

/// Errors produced by a classification feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// Camera or model could not be brought up
    #[error("Feed initialization failed: {0}")]
    Initialization(String),

    /// Classifier output rejected at the boundary
    #[error("Invalid classifier output: {0}")]
    Validation(#[from] ValidationError),

    /// No classification available for this tick
    #[error("No classification available")]
    Unavailable,

    /// Scripted feed has no frames left
    #[error("Feed exhausted")]
    Exhausted,

    /// Feed used before `load` succeeded
    #[error("Feed not loaded")]
    NotLoaded,
}
