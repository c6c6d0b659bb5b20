//! Quizmarize Extract - plain text from uploaded documents.
//!
//! The parser is picked from the declared MIME type only. Anything that
//! cannot be read, including a payload whose leading bytes do not match the
//! declared kind, yields empty text.

mod error;
mod parsers;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use error::{ExtractError, ExtractResult};
pub use parsers::{DocumentParser, DocxParser, PdfParser};

use tracing::{debug, warn};

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Document kinds text can be extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Pdf,
    Docx,
    Unsupported,
}

impl ContentKind {
    /// Classify a declared MIME type. Parameters after `;` are ignored.
    pub fn from_mime(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            PDF_MIME => ContentKind::Pdf,
            DOCX_MIME => ContentKind::Docx,
            _ => ContentKind::Unsupported,
        }
    }

    fn parser(&self) -> Option<Box<dyn DocumentParser>> {
        match self {
            ContentKind::Pdf => Some(Box::new(PdfParser::new())),
            ContentKind::Docx => Some(Box::new(DocxParser::new())),
            ContentKind::Unsupported => None,
        }
    }
}

/// Extract text, reporting failures as an error.
pub fn try_extract(bytes: &[u8], content_type: &str) -> ExtractResult<String> {
    let parser = ContentKind::from_mime(content_type)
        .parser()
        .ok_or_else(|| ExtractError::UnsupportedContentType(content_type.to_string()))?;
    parser.parse_verified(bytes)
}

/// Extract text from a document, or `""` if nothing could be read.
pub fn extract(bytes: &[u8], content_type: &str) -> String {
    match try_extract(bytes, content_type) {
        Ok(text) => {
            debug!("Extracted {} characters from {}", text.chars().count(), content_type);
            text
        }
        Err(e) => {
            warn!("No text extracted from {} upload: {}", content_type, e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{docx_with_paragraphs, pdf_with_pages};

    #[test]
    fn test_content_kind_from_mime() {
        assert_eq!(ContentKind::from_mime("application/pdf"), ContentKind::Pdf);
        assert_eq!(ContentKind::from_mime("Application/PDF; charset=binary"), ContentKind::Pdf);
        assert_eq!(ContentKind::from_mime(DOCX_MIME), ContentKind::Docx);
        assert_eq!(ContentKind::from_mime("text/plain"), ContentKind::Unsupported);
        assert_eq!(ContentKind::from_mime(""), ContentKind::Unsupported);
    }

    #[test]
    fn test_unsupported_type_is_empty() {
        assert_eq!(extract(b"just some text", "text/plain"), "");
        assert_eq!(extract(b"", "image/png"), "");
    }

    #[test]
    fn test_extract_pdf() {
        let bytes = pdf_with_pages(&["HELLO WORLD"]).unwrap();
        assert!(extract(&bytes, "application/pdf").contains("HELLO WORLD"));
    }

    #[test]
    fn test_extract_docx() {
        let bytes = docx_with_paragraphs(&["Photosynthesis", "Light and water"]).unwrap();
        assert_eq!(extract(&bytes, DOCX_MIME), "Photosynthesis\nLight and water");
    }

    #[test]
    fn test_mismatched_signature_is_empty() {
        let docx = docx_with_paragraphs(&["hidden"]).unwrap();
        assert_eq!(extract(&docx, "application/pdf"), "");

        let pdf = pdf_with_pages(&["hidden"]).unwrap();
        assert_eq!(extract(&pdf, DOCX_MIME), "");
        assert!(matches!(
            try_extract(&pdf, DOCX_MIME),
            Err(ExtractError::SignatureMismatch { kind: "DOCX" })
        ));
    }

    #[test]
    fn test_corrupt_document_is_empty() {
        assert_eq!(extract(b"%PDF-1.4\n%%EOF", "application/pdf"), "");
        assert_eq!(extract(b"PK\x03\x04truncated", DOCX_MIME), "");
    }
}
