use crate::error::{Error, Result};
use hound::WavReader;
use std::path::Path;
use tracing::{debug, info};

use super::backend::AudioFrame;

/// A WAV file loaded into memory, used as a capture source
pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading WAV source {}", path.display());

        let reader = WavReader::open(path).map_err(|e| {
            Error::RecordingFailed(format!("Cannot open {}: {}", path.display(), e))
        })?;

        let hound::WavSpec {
            sample_rate,
            channels,
            bits_per_sample,
            sample_format,
        } = reader.spec();
        if bits_per_sample != 16 || sample_format != hound::SampleFormat::Int {
            return Err(Error::RecordingFailed(format!(
                "Expected 16-bit PCM, got {} bits {:?}",
                bits_per_sample, sample_format
            )));
        }

        let samples = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::RecordingFailed(format!("Corrupt sample data: {}", e)))?;

        let per_second = sample_rate as f64 * channels as f64;
        let duration_seconds = samples.len() as f64 / per_second;
        info!(
            "WAV source {}: {:.1}s at {}Hz/{}ch",
            path.display(),
            duration_seconds,
            sample_rate,
            channels
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate,
            channels,
            samples,
        })
    }

    /// Split into consecutive frames of `frame_ms` milliseconds (the last
    /// frame may be shorter), as a live capture would deliver them
    pub fn frames(&self, frame_ms: u64) -> Vec<AudioFrame> {
        let per_ms = self.sample_rate as u64 * self.channels as u64;
        // Whole sample frames only, so channels stay interleaved correctly
        let samples_per_frame = ((per_ms * frame_ms / 1000) as usize)
            .max(self.channels as usize)
            / self.channels as usize
            * self.channels as usize;

        self.samples
            .chunks(samples_per_frame)
            .enumerate()
            .map(|(i, chunk)| AudioFrame {
                samples: chunk.to_vec(),
                sample_rate: self.sample_rate,
                channels: self.channels,
                timestamp_ms: i as u64 * frame_ms,
            })
            .collect()
    }
}
