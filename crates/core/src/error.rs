use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised by domain-level validation and conversions.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = StdResult<T, CoreError>;
