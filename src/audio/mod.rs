pub mod backend;
pub mod file;
pub mod wav;

pub use backend::{AudioFrame, AudioRecorder, RecorderConfig, RecordingHandle};
pub use file::AudioFile;
pub use wav::{FrameFeed, WavRecorder};
