pub mod api;
pub mod audio;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod navigation;
pub mod profile;
pub mod recorder;
pub mod session;
pub mod upload;

pub use api::{ApiClient, AuthProbe};
pub use audio::{AudioFile, AudioFrame, AudioRecorder, FrameFeed, RecorderConfig, RecordingHandle, WavRecorder};
pub use auth::{AuthFlow, AuthStage};
pub use catalog::Catalog;
pub use config::Config;
pub use error::{Error, Result};
pub use navigation::{initial_route, InitialRoute, LogsView, NavigationState, PlayersView, Tab, View};
pub use profile::ProfileService;
pub use recorder::{RecorderController, RecorderState, RecordingSession};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use upload::{UploadClient, UploadReceipt, UploadRequest};
