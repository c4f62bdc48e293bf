//! Error types for gs-scout
//!
//! Fatal pipeline failures only. Name rejections and malformed individual
//! play entries are parsing noise and never become errors.

use thiserror::Error;

/// Scout pipeline error type
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Extraction collaborator kept returning unusable output
    #[error("Extraction failed for window {window} after {attempts} attempt(s): {reason}")]
    ExtractionFailed {
        window: usize,
        attempts: u32,
        reason: String,
    },

    /// No identity cleared the minimum plate appearance threshold
    #[error("No hitters with >= {min_plate_appearances} PA parsed")]
    NoQualifyingIdentity { min_plate_appearances: u32 },

    /// BPE encoding tables unavailable
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Language model request failed (transport, HTTP status, response shape)
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Invalid pipeline parameters
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// gs-common error
    #[error("Common error: {0}")]
    Common(#[from] gs_common::Error),
}

/// Result type for scout operations
pub type ScoutResult<T> = Result<T, ScoutError>;
