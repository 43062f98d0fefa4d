//! Error types for PawTrack

use thiserror::Error;

/// Failure conditions a position source can report.
///
/// Each maps to the user-visible message the tracking surfaces display, and
/// each stops the session rather than letting it continue on stale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionErrorKind {
    #[error("Location access denied by user")]
    PermissionDenied,

    #[error("Location information unavailable")]
    PositionUnavailable,

    #[error("Location request timed out")]
    Timeout,
}

/// Errors a tracking-record sink can report on submission.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    #[error("sink rejected record: {0}")]
    Rejected(String),

    #[error("sink unavailable: {0}")]
    Unavailable(String),

    #[error("sink submission timed out")]
    Timeout,
}

/// Errors that can occur while tracking
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("{0}")]
    Position(#[from] PositionErrorKind),

    #[error("tracking session task failed: {0}")]
    Session(String),

    #[error("invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid sample: {0}")]
    InvalidSample(String),
}
