use crate::audio::{AudioRecorder, RecordingHandle};
use crate::config::UploadConfig;
use crate::error::{Error, Result};
use crate::session::SessionStore;
use crate::upload::{UploadClient, UploadReceipt, UploadRequest};
use chrono::Utc;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Lifecycle position of the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Uploading,
}

/// The single recording lifecycle owned by a controller.
///
/// `handle` is `Some` exactly while `state` is `Recording`; `pending` is `Some`
/// exactly while `state` is `Uploading`.
#[derive(Debug)]
pub struct RecordingSession {
    state: RecorderState,
    handle: Option<RecordingHandle>,
    pending: Option<UploadRequest>,
}

impl RecordingSession {
    fn idle() -> Self {
        Self {
            state: RecorderState::Idle,
            handle: None,
            pending: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn handle(&self) -> Option<&RecordingHandle> {
        self.handle.as_ref()
    }

    /// The finalized artifact waiting to be sent
    pub fn pending_upload(&self) -> Option<&UploadRequest> {
        self.pending.as_ref()
    }

    pub fn last_artifact(&self) -> Option<&Path> {
        self.pending.as_ref().map(|r| r.artifact.as_path())
    }
}

/// Drives record → stop → upload for one screen
pub struct RecorderController {
    recorder: Box<dyn AudioRecorder>,
    uploader: UploadClient,
    store: Arc<dyn SessionStore>,
    upload_config: UploadConfig,
    permission: Option<bool>,
    session: RecordingSession,
}

impl RecorderController {
    pub fn new(
        recorder: Box<dyn AudioRecorder>,
        uploader: UploadClient,
        store: Arc<dyn SessionStore>,
        upload_config: UploadConfig,
    ) -> Self {
        Self {
            recorder,
            uploader,
            store,
            upload_config,
            permission: None,
            session: RecordingSession::idle(),
        }
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    pub fn state(&self) -> RecorderState {
        self.session.state
    }

    /// Reset is offered only when nothing is being captured or sent
    pub fn can_reset(&self) -> bool {
        self.session.state == RecorderState::Idle
    }

    /// Ask for microphone permission. Asked once; later calls return the
    /// remembered answer.
    pub async fn mount(&mut self) -> Result<bool> {
        if let Some(granted) = self.permission {
            return Ok(granted);
        }

        match self.recorder.request_permission().await {
            Ok(granted) => {
                if !granted {
                    warn!("Microphone permission denied");
                }
                self.permission = Some(granted);
                Ok(granted)
            }
            Err(e) => {
                error!("Failed to request microphone permission: {}", e);
                self.permission = Some(false);
                Err(e)
            }
        }
    }

    /// Idle → Recording
    pub async fn start(&mut self) -> Result<()> {
        if self.session.state != RecorderState::Idle {
            warn!("Start ignored, recorder is {:?}", self.session.state);
            return Err(Error::RecordingInProgress);
        }
        if self.permission != Some(true) {
            return Err(Error::Permission);
        }

        let handle = match self.recorder.start().await {
            Ok(handle) => handle,
            Err(e) => {
                error!("Failed to start recording on {}: {}", self.recorder.name(), e);
                return Err(match e {
                    e @ (Error::Permission | Error::RecordingFailed(_)) => e,
                    other => Error::RecordingFailed(other.to_string()),
                });
            }
        };

        info!("Recording started ({})", handle.id());
        self.session.handle = Some(handle);
        self.session.state = RecorderState::Recording;

        Ok(())
    }

    /// Recording → Uploading. The finalized artifact is held by the session
    /// until `finish_upload` sends it or `reset` drops it.
    pub async fn stop(&mut self) -> Result<&UploadRequest> {
        if self.session.state == RecorderState::Uploading {
            return Err(Error::RecordingInProgress);
        }

        let Some(handle) = self.session.handle.take() else {
            info!("No recording to stop");
            self.session = RecordingSession::idle();
            return Err(Error::NoActiveRecording);
        };

        let elapsed = (Utc::now() - handle.started_at()).num_milliseconds() as f64 / 1000.0;
        let artifact = match self.recorder.stop(handle).await {
            Ok(Some(path)) => path,
            Ok(None) => {
                self.session = RecordingSession::idle();
                return Err(Error::RecordingFailed(
                    "No recording URI available".to_string(),
                ));
            }
            Err(e) => {
                self.session = RecordingSession::idle();
                return Err(match e {
                    e @ Error::RecordingFailed(_) => e,
                    other => Error::RecordingFailed(other.to_string()),
                });
            }
        };

        info!("Recording stopped after {:.1}s: {}", elapsed, artifact.display());

        // A missing session surfaces as MissingIdentity from the upload
        let user_id = match self.store.get().await {
            Ok(session) => session.map(|s| s.user_id),
            Err(e) => {
                warn!("Could not read session: {}", e);
                None
            }
        };

        self.session.state = RecorderState::Uploading;
        let request = UploadRequest::new(artifact, &self.upload_config, user_id);
        Ok(&*self.session.pending.insert(request))
    }

    /// Uploading → Idle, whatever the upload outcome. Sends the artifact
    /// finalized by `stop`, with an optional description.
    pub async fn finish_upload(&mut self, description: Option<String>) -> Result<UploadReceipt> {
        let Some(mut request) = self.session.pending.take() else {
            return Err(Error::NoActiveRecording);
        };
        if let Some(description) = description {
            request = request.with_description(description);
        }

        let result = self.uploader.upload(&request).await;
        match &result {
            Ok(receipt) => info!("Recording uploaded (success={})", receipt.success),
            Err(e) => error!("Recording upload failed: {}", e),
        }

        discard_artifact(&request.artifact).await;
        self.session = RecordingSession::idle();

        result
    }

    pub async fn stop_and_upload(&mut self) -> Result<UploadReceipt> {
        self.stop().await?;
        self.finish_upload(None).await
    }

    /// Drop any in-progress capture or unsent artifact without uploading
    pub async fn reset(&mut self) -> Result<()> {
        if let Some(handle) = self.session.handle.take() {
            if let Err(e) = self.recorder.discard(handle).await {
                warn!("Failed to discard recording: {}", e);
            }
        }
        if let Some(request) = self.session.pending.take() {
            info!("Dropping unsent recording {}", request.artifact.display());
            discard_artifact(&request.artifact).await;
        }

        info!("Recorder reset");
        self.session = RecordingSession::idle();
        Ok(())
    }

    /// Teardown: a live recording goes through the normal stop path so the
    /// device is released, and an artifact still waiting is sent. Returns
    /// `None` when there was nothing to upload.
    pub async fn unmount(&mut self) -> Result<Option<UploadReceipt>> {
        match self.session.state {
            RecorderState::Idle => Ok(None),
            RecorderState::Recording => {
                info!("Unmounting while recording, stopping");
                self.stop_and_upload().await.map(Some)
            }
            RecorderState::Uploading => {
                info!("Unmounting with an unsent recording, uploading");
                self.finish_upload(None).await.map(Some)
            }
        }
    }
}

async fn discard_artifact(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove artifact {}: {}", path.display(), e),
    }
}
