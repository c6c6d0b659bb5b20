//! Quizmarize Core - Domain types shared by every Quizmarize crate.

mod error;
mod task;
mod types;

pub use error::{Error, Result};
pub use task::*;
pub use types::*;
