//! Quizmarize Pipeline - from uploaded bytes to stored text, summary and tasks.

mod error;
mod pipeline;

pub use error::{PipelineError, PipelineResult};
pub use pipeline::{DocumentPipeline, IngestOutcome, UploadRequest, PREVIEW_CHARS};
