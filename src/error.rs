//! Error types for the hand-notes client
//!
//! Every failure is terminal for the operation that raised it; nothing here is
//! retried automatically.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed phone number, OTP or username; no network call was made
    #[error("{0}")]
    Validation(String),

    /// Microphone access was not granted
    #[error("Microphone permission not granted")]
    Permission,

    /// A recording lifecycle is already in flight on this controller
    #[error("A recording is already in progress")]
    RecordingInProgress,

    /// Stop or finish requested with nothing recording
    #[error("No active recording")]
    NoActiveRecording,

    /// The recorder could not start or did not produce an artifact
    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    /// No complete session is stored; the user must log in again
    #[error("User ID not found. Please login again.")]
    MissingIdentity,

    /// The upload endpoint rejected the artifact
    #[error("Upload failed with status {status}: {body}")]
    Upload { status: u16, body: String },

    /// Any other endpoint answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Reading or writing the persisted session failed
    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller should route the user back to login
    pub fn requires_reauth(&self) -> bool {
        match self {
            Error::MissingIdentity => true,
            Error::Api { status, .. } | Error::Upload { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Whether the failure warrants a blocking notification.
    ///
    /// Stopping with nothing recorded is the only silent outcome.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Error::NoActiveRecording)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Decode(e.to_string())
        } else {
            Error::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reauth_on_missing_identity_and_401() {
        assert!(Error::MissingIdentity.requires_reauth());
        assert!(Error::Api {
            status: 401,
            message: "expired".to_string()
        }
        .requires_reauth());
        assert!(!Error::Upload {
            status: 500,
            body: String::new()
        }
        .requires_reauth());
        assert!(!Error::Validation("bad".to_string()).requires_reauth());
    }

    #[test]
    fn test_only_no_active_recording_is_silent() {
        assert!(!Error::NoActiveRecording.is_user_visible());
        assert!(Error::Permission.is_user_visible());
        assert!(Error::RecordingInProgress.is_user_visible());
    }
}
