use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use uuid::Uuid;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since recording started
    pub timestamp_ms: u64,
}

/// Configuration for a recorder's output format
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Directory artifacts are written to
    pub output_dir: PathBuf,
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
}

impl RecorderConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            sample_rate: 16000,
            channels: 1,
        }
    }
}

/// Exclusive reference to an in-progress capture.
///
/// Not `Clone`: whoever holds it is the only party able to stop the capture.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordingHandle {
    id: Uuid,
    started_at: DateTime<Utc>,
}

impl RecordingHandle {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Default for RecordingHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Audio capture device
///
/// Implementations:
/// - `WavRecorder`: writes pushed PCM frames to a WAV file
/// - platform microphones live outside this crate
#[async_trait::async_trait]
pub trait AudioRecorder: Send + Sync {
    /// Ask for microphone access. `Ok(false)` means the user declined.
    async fn request_permission(&mut self) -> Result<bool>;

    /// Begin capturing and hand out the handle for this capture
    async fn start(&mut self) -> Result<RecordingHandle>;

    /// Release the handle and finalize the artifact.
    ///
    /// Returns `None` when nothing usable was captured.
    async fn stop(&mut self, handle: RecordingHandle) -> Result<Option<PathBuf>>;

    /// Release the handle and throw the capture away
    async fn discard(&mut self, handle: RecordingHandle) -> Result<()>;

    /// Check if the device is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get recorder name for logging
    fn name(&self) -> &str;
}
