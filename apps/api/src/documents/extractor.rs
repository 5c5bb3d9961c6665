//! Document Text Extractor backed by `pdf-extract`.

use tracing::warn;

/// Extracted text shorter than this (after trimming) counts as unreadable.
pub const MIN_READABLE_CHARS: usize = 50;

/// Turns an uploaded document into plain text. Failure yields an empty string.
pub trait DocumentTextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> String;
}

pub struct PdfTextExtractor;

impl DocumentTextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> String {
        match pdf_extract::extract_text_from_mem(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("PDF text extraction failed: {e}");
                String::new()
            }
        }
    }
}

/// Whether extracted text is long enough to be worth a model call.
pub fn is_readable(text: &str) -> bool {
    text.trim().chars().count() >= MIN_READABLE_CHARS
}

/// Uploads must carry a `.pdf` filename.
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}
