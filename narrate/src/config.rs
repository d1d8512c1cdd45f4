//! narrate configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_VOICE: &str = "af_bella";
const DEFAULT_LANG: &str = "a";
const DEFAULT_SPEED: f32 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrateConfig {
    /// Default voice identifier
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Default language code ("a" American English, "b" British English)
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Default speech speed multiplier
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Device to use (cuda, cpu). None means auto-detect.
    #[serde(default)]
    pub device: Option<String>,
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

impl Default for NarrateConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            lang: default_lang(),
            speed: default_speed(),
            device: None,
        }
    }
}

impl NarrateConfig {
    /// Get the config file path: ~/.config/cli-programs/narrate.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("narrate.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: NarrateConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NarrateConfig::default();
        assert_eq!(config.voice, "af_bella");
        assert_eq!(config.lang, "a");
        assert_eq!(config.speed, 1.0);
        assert!(config.device.is_none());
    }

    #[test]
    fn test_config_path() {
        let path = NarrateConfig::config_path();
        assert!(path.is_ok());
        let path = path.unwrap();
        assert!(path.ends_with("cli-programs/narrate.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
voice = "bf_emma"
lang = "b"
speed = 0.9
device = "cpu"
"#;
        let config: NarrateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.voice, "bf_emma");
        assert_eq!(config.lang, "b");
        assert_eq!(config.speed, 0.9);
        assert_eq!(config.device, Some("cpu".to_string()));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: NarrateConfig = toml::from_str("").unwrap();
        assert_eq!(config.voice, "af_bella");
        assert_eq!(config.lang, "a");
        assert_eq!(config.speed, 1.0);
    }

    #[test]
    fn test_round_trip() {
        let mut config = NarrateConfig::default();
        config.voice = "am_adam".to_string();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: NarrateConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.voice, "am_adam");
        assert_eq!(parsed.speed, config.speed);
    }
}
