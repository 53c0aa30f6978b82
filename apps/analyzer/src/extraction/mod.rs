//! Extractor: turns uploaded PDF bytes into plain text plus a first-page preview.
//!
//! Only PDF byte streams are supported. DOC/DOCX uploads are accepted by the
//! upload form but fail here with `UnsupportedFormat`.

pub mod thumbnail;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

const PDF_SIGNATURE: &[u8] = b"%PDF-";
/// Readers tolerate leading garbage before the header; so do we, within this window.
const SIGNATURE_SEARCH_WINDOW: usize = 1024;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported document format: only PDF files can be analyzed")]
    UnsupportedFormat,

    #[error("Could not parse PDF: {0}")]
    Parse(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("Could not render preview: {0}")]
    Render(String),
}

/// Text and preview produced once per upload.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedContent {
    /// One line per page, page order preserved.
    pub text: String,
    /// `data:image/png;base64,...`
    pub thumbnail: String,
}

/// Extracts text from every page and renders a preview of page 1.
///
/// Any error means the upload cannot be analyzed; callers must stop before
/// making a network call.
pub fn extract(bytes: &[u8]) -> Result<ExtractedContent, ExtractionError> {
    if !has_pdf_signature(bytes) {
        return Err(ExtractionError::UnsupportedFormat);
    }

    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractionError::Parse(e.to_string()))?;

    let first_page = pages.first().ok_or(ExtractionError::NoPages)?;
    let thumbnail = thumbnail::render_first_page(bytes, first_page)?;
    let text = join_pages(&pages);

    debug!(
        "Extracted {} page(s), {} chars of text",
        pages.len(),
        text.len()
    );

    Ok(ExtractedContent { text, thumbnail })
}

fn has_pdf_signature(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(SIGNATURE_SEARCH_WINDOW)];
    window
        .windows(PDF_SIGNATURE.len())
        .any(|w| w == PDF_SIGNATURE)
}

/// Joins each page's fragments with single spaces and ends every page with a newline.
fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages {
        let fragments: Vec<&str> = page
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        text.push_str(&fragments.join(" "));
        text.push('\n');
    }
    text.trim().to_string()
}
