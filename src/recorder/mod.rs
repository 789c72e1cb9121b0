//! Record → stop → upload lifecycle
//!
//! `RecorderController` owns exactly one `RecordingSession` and an
//! `AudioRecorder` device:
//! - `start` is accepted only from `Idle`
//! - `stop` finalizes the artifact and moves to `Uploading`
//! - `finish_upload` sends the held artifact and always lands back in `Idle`
//! - `reset` and `unmount` never leave an artifact stranded in `Uploading`

mod controller;

pub use controller::{RecorderController, RecorderState, RecordingSession};
