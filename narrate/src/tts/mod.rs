//! TTS backend trait and synthesis options.

pub mod kokoro;

use anyhow::Result;
use clap::ValueEnum;

/// Language selection for synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Language {
    /// American English
    #[value(name = "a")]
    AmericanEnglish,
    /// British English
    #[value(name = "b")]
    BritishEnglish,
}

impl Language {
    /// The single-letter code the speech pipeline expects.
    pub fn code(&self) -> &'static str {
        match self {
            Language::AmericanEnglish => "a",
            Language::BritishEnglish => "b",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(Language::AmericanEnglish),
            "b" => Some(Language::BritishEnglish),
            _ => None,
        }
    }
}

/// Options for one synthesis run.
#[derive(Debug, Clone)]
pub struct TtsOptions {
    /// Voice identifier, e.g. "af_bella"
    pub voice: String,
    /// Language of the input text
    pub lang: Language,
    /// Speech speed multiplier (1.0 = normal)
    pub speed: f32,
}

impl Default for TtsOptions {
    fn default() -> Self {
        Self {
            voice: "af_bella".to_string(),
            lang: Language::AmericanEnglish,
            speed: 1.0,
        }
    }
}

impl TtsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn with_lang(mut self, lang: Language) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

/// One unit of synthesized audio, as emitted by the speech pipeline for
/// one segment of input text.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// The text segment this chunk was synthesized from
    pub text: String,
    /// Mono samples at the fixed output sample rate
    pub samples: Vec<f32>,
}

/// TTS backend trait - all speech engines implement this.
pub trait TtsBackend {
    /// Synthesize text into audio chunks in emission order.
    fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<Vec<AudioChunk>>;

    /// Device being used (cuda, cpu).
    fn device(&self) -> &str;
}

/// Create a TTS backend.
///
/// # Arguments
/// * `device` - Device to use: "cuda", "cpu", or None for auto-detect
pub fn create_backend(device: Option<&str>) -> Result<Box<dyn TtsBackend>> {
    Ok(Box::new(kokoro::KokoroBackend::new(device)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::AmericanEnglish.code(), "a");
        assert_eq!(Language::BritishEnglish.code(), "b");
        assert_eq!(Language::from_code("a"), Some(Language::AmericanEnglish));
        assert_eq!(Language::from_code("b"), Some(Language::BritishEnglish));
        assert_eq!(Language::from_code("x"), None);
    }

    #[test]
    fn test_tts_options_default() {
        let opts = TtsOptions::default();
        assert_eq!(opts.voice, "af_bella");
        assert_eq!(opts.lang, Language::AmericanEnglish);
        assert_eq!(opts.speed, 1.0);
    }

    #[test]
    fn test_tts_options_builder() {
        let opts = TtsOptions::new()
            .with_voice("bf_emma")
            .with_lang(Language::BritishEnglish)
            .with_speed(1.3);

        assert_eq!(opts.voice, "bf_emma");
        assert_eq!(opts.lang, Language::BritishEnglish);
        assert_eq!(opts.speed, 1.3);
    }
}
