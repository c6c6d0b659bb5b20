//! PDF document parser.

use super::DocumentParser;
use crate::error::ExtractResult;
use lopdf::Document;
use tracing::{debug, warn};

/// Parser for PDF files.
pub struct PdfParser;

impl PdfParser {
    /// Create a new PDF parser.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for PdfParser {
    fn parse(&self, bytes: &[u8]) -> ExtractResult<String> {
        let document = Document::load_mem(bytes)?;
        let pages = document.get_pages();
        debug!("Parsing PDF with {} pages", pages.len());

        let mut text = String::new();
        for page_number in pages.keys() {
            match document.extract_text(&[*page_number]) {
                Ok(page_text) => text.push_str(&page_text),
                // A broken page contributes nothing
                Err(e) => warn!("Could not extract text from page {}: {}", page_number, e),
            }
        }

        debug!("Extracted {} characters from PDF", text.len());
        Ok(text)
    }

    fn signature(&self) -> &'static [u8] {
        b"%PDF-"
    }

    fn name(&self) -> &'static str {
        "PDF"
    }
}
