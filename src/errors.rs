use thiserror::Error;

use crate::io::IoError;
use crate::rule::{FormatError, RuleError};

#[derive(Error, Debug)]
pub enum RuleBridgeError {
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("No rule source given: pass --input or set CHOMPY_EVAL_DIR")]
    MissingSource,
}
