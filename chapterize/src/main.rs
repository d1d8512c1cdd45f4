//! chapterize - split a PDF into per-chapter text files using its outline.

mod extract;
mod outline;
mod writer;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "chapterize")]
#[command(about = "Split a PDF into per-chapter text files using its embedded outline", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the PDF file
    pdf_path: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match convert_pdf(&args.pdf_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Error converting PDF: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Convert one PDF into per-chapter text files.
///
/// Chapters already written when a later chapter fails remain on disk;
/// nothing after the failing chapter is attempted.
fn convert_pdf(pdf_path: &Path) -> Result<()> {
    if !pdf_path.exists() {
        anyhow::bail!("File '{}' does not exist", pdf_path.display());
    }

    let output_dir = writer::output_dir_for(pdf_path);

    eprintln!("Parsing PDF: {}", pdf_path.display());
    let doc = Document::load(pdf_path)
        .with_context(|| format!("Failed to open {}", pdf_path.display()))?;

    let chapters = outline::resolve_chapters(&doc);
    let file_name = pdf_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    eprintln!("Found {} chapters in '{}'", chapters.len(), file_name);

    let pb = ProgressBar::new(chapters.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    for chapter in &chapters {
        pb.set_message(format!(
            "{} (pages {}-{})",
            chapter.title, chapter.start_page, chapter.end_page
        ));

        // Each range re-reads the source document; see extract.rs.
        let text = extract::extract_page_range(pdf_path, chapter.start_page, chapter.end_page)
            .with_context(|| format!("Failed to extract chapter '{}'", chapter.title))?;

        let chapter_file = writer::write_chapter(&output_dir, &chapter.title, &text)?;
        pb.println(format!("Saved chapter to: {}", chapter_file.display()));
        pb.inc(1);
    }

    pb.finish_and_clear();
    println!(
        "Conversion complete! All chapters saved to directory: {}",
        output_dir.display()
    );

    Ok(())
}
