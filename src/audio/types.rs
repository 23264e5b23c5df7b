use std::path::Path;

use crate::error::{AudioError, Result};

/// Decoded audio owned by one pipeline invocation
#[derive(Debug, Clone)]
pub struct AudioTrack {
    /// Audio samples (interleaved for stereo, mono for single channel)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
}

impl AudioTrack {
    /// Number of sample frames (one sample per channel)
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Write the track as a 32-bit float WAV file
    pub fn write_wav<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let write_failed = |e: hound::Error| AudioError::WriteFailed { reason: e.to_string() };

        let mut writer = hound::WavWriter::create(path.as_ref(), spec).map_err(write_failed)?;
        for &sample in &self.samples {
            writer.write_sample(sample).map_err(write_failed)?;
        }
        writer.finalize().map_err(write_failed)?;

        Ok(())
    }
}
