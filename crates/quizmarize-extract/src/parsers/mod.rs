//! Document parsers for the supported upload types.

mod docx;
mod pdf;

pub use docx::DocxParser;
pub use pdf::PdfParser;

use crate::error::{ExtractError, ExtractResult};

/// Trait for document parsers.
pub trait DocumentParser: Send + Sync {
    /// Extract the plain text of an in-memory document.
    fn parse(&self, bytes: &[u8]) -> ExtractResult<String>;

    /// Leading bytes every document of this kind starts with.
    fn signature(&self) -> &'static [u8];

    /// Human readable name used in logs.
    fn name(&self) -> &'static str;

    /// Check the signature, then parse.
    fn parse_verified(&self, bytes: &[u8]) -> ExtractResult<String> {
        if !bytes.starts_with(self.signature()) {
            return Err(ExtractError::SignatureMismatch { kind: self.name() });
        }
        self.parse(bytes)
    }
}
