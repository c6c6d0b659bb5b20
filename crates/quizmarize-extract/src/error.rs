//! Error types for text extraction.

use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur while reading a document.
///
/// These never leave [`crate::extract`], which reports failures as empty text.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Content does not look like {kind}")]
    SignatureMismatch { kind: &'static str },

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("DOCX package error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("DOCX markup error: {0}")]
    Xml(#[from] quick_xml::Error),
}
