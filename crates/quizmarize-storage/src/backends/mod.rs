//! Storage backends.

pub mod local;
pub mod memory;
pub mod s3;
