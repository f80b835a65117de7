//! Error types for Phantom.
//!
//! None of these are fatal to a session: callers log them and degrade to a
//! no-op or to the deterministic fallback.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhantomError {
    #[error("Haptics unavailable on this device")]
    HapticsUnavailable,

    #[error("Haptic engine error: {0}")]
    Haptics(String),

    #[error("Report model error: {0}")]
    Model(String),

    #[error("Report model timed out after {0} ms")]
    ModelTimeout(u64),

    #[error("Malformed report: {0}")]
    MalformedReport(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Engine stopped")]
    EngineStopped,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PhantomError {
    /// True for failures of the optional report model. These always resolve
    /// to the deterministic report and are never shown to the user.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            PhantomError::Model(_)
                | PhantomError::ModelTimeout(_)
                | PhantomError::MalformedReport(_)
                | PhantomError::Json(_)
        )
    }
}
