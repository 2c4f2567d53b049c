//! # Playback Error Types

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors returned by playback session commands.
///
/// Engine failures are not represented here: they are asynchronous and reach
/// the host through `PlayerHost::on_error`.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The session was released; it accepts no further commands.
    #[error("Playback session has been released")]
    Released,

    /// No Tokio runtime is available to run the engine event pump.
    #[error("No async runtime available: {0}")]
    RuntimeUnavailable(String),

    /// Adapter configuration failed validation.
    #[error("Invalid adapter configuration: {0}")]
    InvalidConfig(String),

    /// A bridge implementation reported a failure.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    /// Returns `true` if the error is caused by using a released session.
    pub fn is_released(&self) -> bool {
        matches!(self, PlaybackError::Released)
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
