use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::backend::{AudioFrame, AudioRecorder, RecorderConfig, RecordingHandle};
use crate::error::{Error, Result};

/// Frames buffered between the capture side and the file writer
const FRAME_BUFFER: usize = 256;

/// Entry point for capture code to push frames into whichever capture is
/// currently active. Cheap to clone; outlives individual captures.
#[derive(Clone, Default)]
pub struct FrameFeed {
    slot: Arc<Mutex<Option<mpsc::Sender<AudioFrame>>>>,
}

impl FrameFeed {
    /// Queue a frame. Returns `false` when no capture is active.
    pub async fn push(&self, frame: AudioFrame) -> bool {
        let tx = self.slot.lock().await.clone();
        match tx {
            Some(tx) => tx.send(frame).await.is_ok(),
            None => false,
        }
    }

    pub async fn is_open(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

/// Recorder that writes pushed PCM frames to a WAV file
///
/// Capture code keeps a [`FrameFeed`] from [`WavRecorder::feed`] and pushes
/// frames while a capture is running; `stop` finalizes the file.
pub struct WavRecorder {
    config: RecorderConfig,
    permission_granted: bool,
    feed: FrameFeed,
    active: Option<ActiveCapture>,
}

struct ActiveCapture {
    id: Uuid,
    path: PathBuf,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<Result<usize>>,
}

impl WavRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            permission_granted: true,
            feed: FrameFeed::default(),
            active: None,
        }
    }

    /// Answer permission requests with `granted`
    pub fn with_permission(mut self, granted: bool) -> Self {
        self.permission_granted = granted;
        self
    }

    pub fn feed(&self) -> FrameFeed {
        self.feed.clone()
    }

    /// Signal the writer, wait for it and return the file and sample count
    async fn finish(&mut self, handle: RecordingHandle) -> Result<(PathBuf, usize)> {
        let active = match self.active.take() {
            Some(active) if active.id == handle.id() => active,
            Some(active) => {
                self.active = Some(active);
                return Err(Error::RecordingFailed(
                    "Handle does not belong to the active capture".to_string(),
                ));
            }
            None => return Err(Error::NoActiveRecording),
        };

        self.feed.slot.lock().await.take();
        // The writer may already have exited if every sender was dropped
        let _ = active.stop_tx.send(());

        let written = match active.task.await {
            Ok(written) => written,
            Err(e) => Err(Error::RecordingFailed(format!("WAV writer task panicked: {}", e))),
        };

        match written {
            Ok(sample_count) => Ok((active.path, sample_count)),
            Err(e) => {
                remove_quietly(&active.path);
                Err(e)
            }
        }
    }
}

#[async_trait::async_trait]
impl AudioRecorder for WavRecorder {
    async fn request_permission(&mut self) -> Result<bool> {
        Ok(self.permission_granted)
    }

    async fn start(&mut self) -> Result<RecordingHandle> {
        if !self.permission_granted {
            return Err(Error::Permission);
        }
        if self.active.is_some() {
            return Err(Error::RecordingInProgress);
        }

        fs::create_dir_all(&self.config.output_dir)?;

        let handle = RecordingHandle::new();
        let path = self
            .config
            .output_dir
            .join(format!("recording-{}.wav", handle.id()));

        let writer = WavFileWriter::create(path.clone(), self.config.sample_rate, self.config.channels)?;

        let (frame_tx, frame_rx) = mpsc::channel(FRAME_BUFFER);
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(writer.run(frame_rx, stop_rx));
        *self.feed.slot.lock().await = Some(frame_tx);

        info!("WAV capture started: {}", path.display());

        self.active = Some(ActiveCapture {
            id: handle.id(),
            path,
            stop_tx,
            task,
        });

        Ok(handle)
    }

    async fn stop(&mut self, handle: RecordingHandle) -> Result<Option<PathBuf>> {
        let (path, sample_count) = self.finish(handle).await?;

        if sample_count == 0 {
            warn!("No audio captured, removing {}", path.display());
            remove_quietly(&path);
            return Ok(None);
        }

        info!(
            "WAV capture finalized: {} ({} samples)",
            path.display(),
            sample_count
        );
        Ok(Some(path))
    }

    async fn discard(&mut self, handle: RecordingHandle) -> Result<()> {
        let (path, _) = self.finish(handle).await?;
        remove_quietly(&path);
        info!("WAV capture discarded");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.active.is_some()
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}

/// Writes frames of one fixed format to a WAV file
struct WavFileWriter {
    writer: hound::WavWriter<BufWriter<File>>,
    path: PathBuf,
    sample_rate: u32,
    channels: u16,
    sample_count: usize,
}

impl WavFileWriter {
    fn create(path: PathBuf, sample_rate: u32, channels: u16) -> Result<Self> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(&path, spec).map_err(|e| {
            Error::RecordingFailed(format!("Failed to create WAV file {:?}: {}", path, e))
        })?;

        Ok(Self {
            writer,
            path,
            sample_rate,
            channels,
            sample_count: 0,
        })
    }

    async fn run(
        mut self,
        mut frame_rx: mpsc::Receiver<AudioFrame>,
        mut stop_rx: oneshot::Receiver<()>,
    ) -> Result<usize> {
        loop {
            tokio::select! {
                frame = frame_rx.recv() => match frame {
                    Some(frame) => self.write_frame(&frame)?,
                    None => break,
                },
                _ = &mut stop_rx => {
                    // Keep frames that were queued before the stop
                    while let Ok(frame) = frame_rx.try_recv() {
                        self.write_frame(&frame)?;
                    }
                    break;
                }
            }
        }

        self.finalize()
    }

    fn write_frame(&mut self, frame: &AudioFrame) -> Result<()> {
        if frame.sample_rate != self.sample_rate || frame.channels != self.channels {
            warn!(
                "Dropping frame at {}ms: {}Hz/{}ch does not match {}Hz/{}ch",
                frame.timestamp_ms, frame.sample_rate, frame.channels, self.sample_rate, self.channels
            );
            return Ok(());
        }

        for &sample in &frame.samples {
            self.writer
                .write_sample(sample)
                .map_err(|e| Error::RecordingFailed(format!("Failed to write sample: {}", e)))?;
        }
        self.sample_count += frame.samples.len();

        Ok(())
    }

    fn finalize(self) -> Result<usize> {
        self.writer
            .finalize()
            .map_err(|e| Error::RecordingFailed(format!("Failed to finalize WAV file: {}", e)))?;
        debug!("Finalized {} ({} samples)", self.path.display(), self.sample_count);
        Ok(self.sample_count)
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
}
