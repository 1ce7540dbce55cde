//! Error types for the scroll smoothing pipeline.

use thiserror::Error;

/// Errors that can occur while arming or running the smoothing pipeline.
#[derive(Error, Debug)]
pub enum GlideError {
    /// The accessibility permission gate refused us. Not retried; the user
    /// has to grant access and relaunch.
    #[error("accessibility permission not granted")]
    PermissionDenied,

    /// The OS refused to create the event tap despite authorization.
    #[error("event tap creation failed: {0}")]
    TapCreationFailed(String),

    /// The tap was created but could not be attached to the run loop.
    #[error("event tap registration failed: {0}")]
    TapRegistrationFailed(String),

    /// Scroll interception is not implemented for this platform.
    #[error("platform error: {0}")]
    Platform(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for smoothing operations.
pub type GlideResult<T> = Result<T, GlideError>;
