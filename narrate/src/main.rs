//! narrate - synthesize WAV narration from text files using Kokoro TTS.

mod audio;
mod config;
mod tts;

use anyhow::{Context, Result};
use audio::AudioBuffer;
use clap::{Parser, Subcommand};
use config::NarrateConfig;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tts::{Language, TtsBackend, TtsOptions};

#[derive(Parser, Debug)]
#[command(name = "narrate")]
#[command(about = "Narrate text files and save them as WAV audio", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a specific text file. If omitted, processes all .txt
    /// files in the current directory.
    file_path: Option<PathBuf>,

    /// Voice to use for narration
    #[arg(long)]
    voice: Option<String>,

    /// Language code: "a" for American English, "b" for British English
    #[arg(long, value_enum)]
    lang: Option<Language>,

    /// Speech speed multiplier
    #[arg(long)]
    speed: Option<f32>,

    /// Force CPU synthesis even if a GPU is available
    #[arg(long)]
    cpu: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Voice identifier, e.g. "af_bella"
        voice: String,
    },
    /// Set default speech speed
    SetSpeed {
        /// Speed multiplier (1.0 = normal)
        value: f32,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let config = NarrateConfig::load().context("Failed to load configuration")?;
    let options = build_options(&args, &config);

    // Find txt files to process
    let files = match &args.file_path {
        Some(path) => vec![path.clone()],
        None => find_text_files(Path::new("."))?,
    };

    if files.is_empty() {
        println!("No txt files found in the current directory.");
        return Ok(());
    }

    let device = if args.cpu {
        Some("cpu".to_string())
    } else {
        config.device.clone()
    };
    let backend = tts::create_backend(device.as_deref())?;

    let batch = args.file_path.is_none();
    let mut narrated_count = 0;
    let mut error_count = 0;

    for file_path in &files {
        eprintln!("\nProcessing file: {}", file_path.display());

        match process_file(backend.as_ref(), file_path, &options) {
            Ok(output_path) => {
                println!("Narration saved to {}", output_path.display());
                narrated_count += 1;
            }
            Err(e) => {
                eprintln!("Error narrating \"{}\": {e:#}", file_path.display());
                error_count += 1;
            }
        }
    }

    if batch {
        println!("---");
        println!("Narrated: {narrated_count}, Failed: {error_count}");
    }

    if error_count > 0 {
        anyhow::bail!("{error_count} file(s) failed");
    }

    Ok(())
}

/// Merge CLI flags over configured defaults.
fn build_options(args: &Args, config: &NarrateConfig) -> TtsOptions {
    let lang = args.lang.unwrap_or_else(|| {
        Language::from_code(&config.lang).unwrap_or_else(|| {
            log::warn!(
                "configured language {:?} is not recognized; using American English",
                config.lang
            );
            Language::AmericanEnglish
        })
    });

    TtsOptions::new()
        .with_voice(args.voice.clone().unwrap_or_else(|| config.voice.clone()))
        .with_lang(lang)
        .with_speed(args.speed.unwrap_or(config.speed))
}

/// Narrate one text file into `<basename>.wav` in the working directory.
fn process_file(
    backend: &dyn TtsBackend,
    file_path: &Path,
    options: &TtsOptions,
) -> Result<PathBuf> {
    let text = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    let chunks = backend.synthesize(&text, options)?;
    if chunks.is_empty() {
        anyhow::bail!("Pipeline produced no audio");
    }
    eprintln!("Synthesized {} chunk(s)", chunks.len());

    let samples: Vec<Vec<f32>> = chunks.into_iter().map(|c| c.samples).collect();
    let buffer = AudioBuffer::from_chunks(&samples);

    let output_path = output_path_for(file_path);
    buffer.write_wav(&output_path)?;

    Ok(output_path)
}

/// Output filename: the input's base name with a .wav extension, in the
/// working directory.
fn output_path_for(file_path: &Path) -> PathBuf {
    let stem = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "narration".to_string());
    PathBuf::from(format!("{stem}.wav"))
}

/// Find all text files directly inside the given directory, in
/// filesystem enumeration order.
fn find_text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir).context("Failed to read directory")? {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();
        if path.is_file() && is_txt(&path) {
            files.push(path);
        }
    }

    Ok(files)
}

/// Check if a path is a text file (case-insensitive)
fn is_txt(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = NarrateConfig::load()?;
            println!("Configuration file: {:?}", NarrateConfig::config_path()?);
            println!();
            println!("voice = \"{}\"", config.voice);
            println!("lang = \"{}\"", config.lang);
            println!("speed = {}", config.speed);
            if let Some(device) = &config.device {
                println!("device = \"{device}\"");
            } else {
                println!("device = (auto-detect)");
            }
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = NarrateConfig::load()?;
            config.voice = voice.clone();
            config.save()?;
            println!("Default voice set to: {voice}");
        }
        ConfigAction::SetSpeed { value } => {
            let mut config = NarrateConfig::load()?;
            config.speed = *value;
            config.save()?;
            println!("Default speed set to: {}", config.speed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_txt() {
        assert!(is_txt(Path::new("story.txt")));
        assert!(is_txt(Path::new("story.TXT")));
        assert!(!is_txt(Path::new("story.md")));
        assert!(!is_txt(Path::new("story")));
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("chapters/Intro.txt")),
            PathBuf::from("Intro.wav")
        );
        assert_eq!(
            output_path_for(Path::new("story.txt")),
            PathBuf::from("story.wav")
        );
    }

    #[test]
    fn test_find_text_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("b.TXT"), "b").unwrap();
        std::fs::write(dir.path().join("c.md"), "c").unwrap();
        std::fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let mut names: Vec<String> = find_text_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.TXT"]);
    }

    #[test]
    fn test_build_options_cli_overrides_config() {
        let config = NarrateConfig {
            voice: "am_adam".to_string(),
            lang: "b".to_string(),
            speed: 0.8,
            device: None,
        };
        let args = Args {
            file_path: None,
            voice: Some("af_nova".to_string()),
            lang: None,
            speed: Some(1.2),
            cpu: false,
            command: None,
        };

        let options = build_options(&args, &config);
        assert_eq!(options.voice, "af_nova");
        assert_eq!(options.lang, Language::BritishEnglish);
        assert_eq!(options.speed, 1.2);
    }

    #[test]
    fn test_build_options_bad_config_lang_falls_back() {
        let config = NarrateConfig {
            lang: "zz".to_string(),
            ..NarrateConfig::default()
        };
        let args = Args {
            file_path: None,
            voice: None,
            lang: None,
            speed: None,
            cpu: false,
            command: None,
        };

        let options = build_options(&args, &config);
        assert_eq!(options.lang, Language::AmericanEnglish);
    }
}
