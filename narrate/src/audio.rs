//! Audio buffer assembly and WAV output.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

/// Sample rate of all synthesized audio, in Hz.
pub const SAMPLE_RATE: u32 = 24_000;

/// Mono audio samples accumulated from synthesis chunks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
}

impl AudioBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate chunks in emission order. No padding, trimming, or
    /// cross-fade is applied between chunks.
    pub fn from_chunks<S: AsRef<[f32]>>(chunks: &[S]) -> Self {
        let mut buffer = Self::new();
        for chunk in chunks {
            buffer.append(chunk.as_ref());
        }
        buffer
    }

    pub fn append(&mut self, samples: &[f32]) {
        self.samples.extend_from_slice(samples);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds at the fixed sample rate.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / SAMPLE_RATE as f64
    }

    /// Write the buffer as a mono 32-bit float WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let mut writer = WavWriter::create(path, spec)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer
            .finalize()
            .with_context(|| format!("Failed to finalize {}", path.display()))?;

        Ok(())
    }
}
