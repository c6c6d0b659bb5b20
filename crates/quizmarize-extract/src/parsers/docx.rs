//! DOCX document parser.

use super::DocumentParser;
use crate::error::ExtractResult;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Parser for Office Open XML word processing documents.
pub struct DocxParser;

impl DocxParser {
    /// Create a new DOCX parser.
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for DocxParser {
    fn parse(&self, bytes: &[u8]) -> ExtractResult<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut xml = String::new();
        archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;

        let paragraphs = paragraphs(&xml)?;
        debug!("Extracted {} paragraphs from DOCX", paragraphs.len());
        Ok(paragraphs.join("\n"))
    }

    fn signature(&self) -> &'static [u8] {
        b"PK\x03\x04"
    }

    fn name(&self) -> &'static str {
        "DOCX"
    }
}

/// Collect the text of every top-level `w:p` element.
///
/// Runs are concatenated, `w:tab` becomes a tab and `w:br`/`w:cr` a newline.
/// Tab stops declared in paragraph properties are not runs and are skipped.
/// Paragraphs nested inside another paragraph (text boxes) contribute nothing.
fn paragraphs(xml: &str) -> ExtractResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut para_depth = 0usize;
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        let top_level = para_depth == 1;
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    para_depth += 1;
                    if para_depth == 1 {
                        current.clear();
                    }
                }
                b"w:r" => run_depth += 1,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    if para_depth == 1 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    para_depth = para_depth.saturating_sub(1);
                }
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if para_depth == 0 => paragraphs.push(String::new()),
                b"w:tab" if top_level && run_depth > 0 => current.push('\t'),
                b"w:br" | b"w:cr" if top_level && run_depth > 0 => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text && top_level => current.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
