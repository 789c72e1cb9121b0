use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variables with this prefix override file settings,
/// e.g. `HAND_NOTES__API__BASE_URL`.
const ENV_PREFIX: &str = "HAND_NOTES";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote API, without a trailing slash
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the persisted session
    pub session_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub mime_type: String,
    pub file_name: String,
    /// Sent as the `room-id` header when set
    #[serde(default)]
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub recordings_path: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Config {
    /// Load configuration from `path` (extension optional, file optional)
    /// layered over built-in defaults and under environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.timeout_secs", 30)?
            .set_default("storage.session_path", "~/.hand-notes/session.json")?
            .set_default("upload.mime_type", "audio/wav")?
            .set_default("upload.file_name", "recording.wav")?
            .set_default("audio.recordings_path", "~/.hand-notes/recordings")?
            .set_default("audio.sample_rate", 16000)?
            .set_default("audio.channels", 1)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    pub fn session_path(&self) -> PathBuf {
        expand(&self.storage.session_path)
    }

    pub fn recordings_path(&self) -> PathBuf {
        expand(&self.audio.recordings_path)
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            mime_type: "audio/wav".to_string(),
            file_name: "recording.wav".to_string(),
            room_id: None,
        }
    }
}
