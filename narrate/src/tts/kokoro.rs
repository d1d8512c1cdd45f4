//! Kokoro TTS backend using PyO3 to embed Python.
//!
//! Drives the Kokoro `KPipeline` from the `kokoro` Python package: the
//! pipeline splits input text on line breaks, synthesizes each segment,
//! and yields (graphemes, phonemes, audio) tuples which are collected
//! here as raw sample chunks.

use super::{AudioChunk, TtsBackend, TtsOptions};
use anyhow::{Context, Result};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::Once;

/// Initialize Python runtime once.
static PYTHON_INIT: Once = Once::new();

/// CUDA runtime version the pipeline is validated against. Other
/// versions produce a warning only.
const EXPECTED_CUDA_VERSION: &str = "12.6";

/// Pattern the pipeline uses to split input text into chunks.
const SPLIT_PATTERN: &str = r"\n+";

/// Kokoro TTS backend using PyO3.
pub struct KokoroBackend {
    /// Device to use (cuda, cpu)
    device: String,
}

impl KokoroBackend {
    /// Create a new Kokoro backend.
    ///
    /// # Arguments
    /// * `device` - Device to use: "cuda", "cpu", or None for auto-detect
    pub fn new(device: Option<&str>) -> Result<Self> {
        PYTHON_INIT.call_once(|| {
            pyo3::prepare_freethreaded_python();
        });

        let device = match device {
            Some(d) => d.to_string(),
            None => Self::detect_device()?,
        };
        eprintln!("Using device: {device}");

        if device == "cuda" {
            // Version skew is reported but never fatal.
            if let Err(e) = Self::warn_on_cuda_mismatch() {
                log::debug!("could not check CUDA version: {e:#}");
            }
        }

        Ok(Self { device })
    }

    /// Auto-detect the best available device: GPU when the acceleration
    /// runtime reports one, CPU otherwise.
    fn detect_device() -> Result<String> {
        Python::with_gil(|py| {
            let torch = py.import("torch").context("Failed to import torch")?;

            let cuda = torch.getattr("cuda")?;
            if cuda.call_method0("is_available")?.extract::<bool>()? {
                return Ok("cuda".to_string());
            }

            Ok("cpu".to_string())
        })
    }

    /// Warn when the CUDA runtime differs from the validated version.
    fn warn_on_cuda_mismatch() -> Result<()> {
        Python::with_gil(|py| {
            let torch = py.import("torch")?;
            let cuda_version: Option<String> =
                torch.getattr("version")?.getattr("cuda")?.extract()?;

            if let Some(version) = cuda_version {
                eprintln!("CUDA version: {version}");
                if version != EXPECTED_CUDA_VERSION {
                    log::warn!(
                        "current CUDA version is {version}, not {EXPECTED_CUDA_VERSION}"
                    );
                }
            }

            Ok(())
        })
    }

    /// Run the pipeline over the full text and collect every emitted
    /// chunk in order.
    fn synthesize_chunks(&self, text: &str, options: &TtsOptions) -> Result<Vec<AudioChunk>> {
        Python::with_gil(|py| {
            let kokoro = py.import("kokoro").context("Failed to import kokoro")?;
            let pipeline_class = kokoro.getattr("KPipeline")?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("lang_code", options.lang.code())?;
            kwargs.set_item("device", &self.device)?;
            let pipeline = pipeline_class.call((), Some(&kwargs))?;

            let call_kwargs = PyDict::new(py);
            call_kwargs.set_item("voice", &options.voice)?;
            call_kwargs.set_item("speed", options.speed)?;
            call_kwargs.set_item("split_pattern", SPLIT_PATTERN)?;
            let generator = pipeline.call((text,), Some(&call_kwargs))?;

            let mut chunks = Vec::new();
            for item in generator.try_iter()? {
                let item = item?;
                let graphemes: String = item.get_item(0)?.extract()?;
                let samples = extract_samples(&item.get_item(2)?)?;

                log::debug!("chunk {}: {}", chunks.len(), preview(&graphemes));
                chunks.push(AudioChunk {
                    text: graphemes,
                    samples,
                });
            }

            Ok(chunks)
        })
    }
}

impl TtsBackend for KokoroBackend {
    fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<Vec<AudioChunk>> {
        self.synthesize_chunks(text, options)
    }

    fn device(&self) -> &str {
        &self.device
    }
}

/// Pull raw samples out of the pipeline's audio object. Tensors are
/// moved to the CPU and converted through numpy; plain arrays convert
/// directly.
fn extract_samples(audio: &Bound<'_, PyAny>) -> Result<Vec<f32>> {
    let array = if audio.hasattr("cpu")? {
        audio.call_method0("cpu")?.call_method0("numpy")?
    } else {
        audio.clone()
    };

    let samples = array.call_method0("tolist")?.extract()?;
    Ok(samples)
}

/// Shorten chunk text for log output.
fn preview(text: &str) -> String {
    const MAX: usize = 60;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{head}...")
    }
}
