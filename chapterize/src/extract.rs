//! Page-range text extraction.

use anyhow::{Context, Result};
use std::path::Path;

/// Extract the visible text of an inclusive, zero-based page range as a
/// single line.
///
/// Both endpoints are clamped independently into the document's page
/// range before processing. The source file is re-opened and fully
/// re-read on every call; callers extracting many ranges pay that cost
/// per range.
pub fn extract_page_range(pdf_path: &Path, start_page: usize, end_page: usize) -> Result<String> {
    let pages = pdf_extract::extract_text_by_pages(pdf_path)
        .with_context(|| format!("Failed to extract text from {}", pdf_path.display()))?;

    let Some((start, end)) = clamp_range(start_page, end_page, pages.len()) else {
        return Ok(String::new());
    };

    let mut text = String::new();
    for page in &pages[start..=end] {
        text.push_str(page);
    }

    Ok(flatten_line_breaks(&text))
}

/// Clamp both endpoints independently into [0, page_count - 1].
///
/// Returns None when the document has no pages or the clamped range is
/// empty (end before start).
fn clamp_range(start: usize, end: usize, page_count: usize) -> Option<(usize, usize)> {
    if page_count == 0 {
        return None;
    }
    let last = page_count - 1;
    let start = start.min(last);
    let end = end.min(last);
    if end < start {
        return None;
    }
    Some((start, end))
}

/// Replace every line-break character (newline, carriage return, form
/// feed) with a single space. No other normalization is applied.
fn flatten_line_breaks(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' | '\x0c' => ' ',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_range_within_bounds() {
        assert_eq!(clamp_range(2, 7, 10), Some((2, 7)));
    }

    #[test]
    fn test_clamp_range_oversized_end() {
        // Extracting [0, 10^6] on a 10-page document behaves like [0, 9].
        assert_eq!(clamp_range(0, 1_000_000, 10), Some((0, 9)));
    }

    #[test]
    fn test_clamp_range_oversized_start() {
        assert_eq!(clamp_range(50, 60, 10), Some((9, 9)));
    }

    #[test]
    fn test_clamp_range_empty_document() {
        assert_eq!(clamp_range(0, 5, 0), None);
    }

    #[test]
    fn test_clamp_range_inverted() {
        assert_eq!(clamp_range(7, 2, 10), None);
    }

    #[test]
    fn test_flatten_line_breaks() {
        assert_eq!(flatten_line_breaks("a\nb\rc\x0cd"), "a b c d");
    }

    #[test]
    fn test_flatten_preserves_other_whitespace() {
        // Consecutive breaks each become their own space; tabs and
        // doubled spaces pass through untouched.
        assert_eq!(flatten_line_breaks("a\r\nb"), "a  b");
        assert_eq!(flatten_line_breaks("a\tb  c"), "a\tb  c");
    }

    // Extraction against a real PDF exercises the pdf-extract rendering
    // pipeline; that is better suited for integration tests with fixture
    // documents.
}
