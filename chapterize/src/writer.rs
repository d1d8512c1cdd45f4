//! Chapter text persistence.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// The output directory for a PDF: its base filename with the extension
/// stripped, relative to the working directory.
pub fn output_dir_for(pdf_path: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chapters".to_string());
    PathBuf::from(stem)
}

/// Write one chapter's text to `<output_dir>/<title>.txt`, creating the
/// directory if needed. An existing file with the same name is
/// overwritten; chapters with identical sanitized titles clobber each
/// other.
pub fn write_chapter(output_dir: &Path, title: &str, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let chapter_file = output_dir.join(format!("{title}.txt"));
    fs::write(&chapter_file, text)
        .with_context(|| format!("Failed to write {}", chapter_file.display()))?;

    Ok(chapter_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_strips_extension() {
        assert_eq!(
            output_dir_for(Path::new("books/My Book.pdf")),
            PathBuf::from("My Book")
        );
        assert_eq!(output_dir_for(Path::new("plain")), PathBuf::from("plain"));
    }

    #[test]
    fn test_write_chapter_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("Book");

        let path = write_chapter(&out, "Intro", "hello world").unwrap();
        assert_eq!(path, out.join("Intro.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
    }

    #[test]
    fn test_write_chapter_overwrites_silently() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_path_buf();

        write_chapter(&out, "Dup", "first").unwrap();
        let path = write_chapter(&out, "Dup", "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }
}
