//! Engine error types

use thiserror::Error;

/// Errors a caller of the engine can observe
///
/// Provider failures never show up here: they are logged and turned into
/// "no results" before the merge step.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Track {0} has no download URL")]
    NotDownloadable(String),

    #[error("No content available, fallback included")]
    NoContent,
}

pub type Result<T> = std::result::Result<T, EngineError>;
