pub mod reader;
pub mod summary;
pub mod writer;

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Rule directory {dir} does not match the expected files (missing: {missing:?}, unexpected: {unexpected:?})")]
    UnexpectedFiles {
        dir: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    #[error("Duplicate rule name: {0}")]
    DuplicateName(String),
    #[error("Expected {expected} results, found {found}")]
    ResultCount { expected: usize, found: usize },
}
