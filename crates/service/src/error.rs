//! Typed errors for the service layer.
//!
//! Unifies storage, LLM, and domain failures so callers can match on the
//! failure mode instead of downcasting.

use actionlog_core::{ActionId, CoreError};
use actionlog_llm::LlmError;
use actionlog_storage::StorageError;
use thiserror::Error;

use crate::capture::CaptureState;

/// Service-layer error unifying storage, LLM, and domain failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, malformed import, duplicate id).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// LLM API call failed.
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    /// Caller provided invalid input (empty text, bad weight, past date).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A record or reminder with the given id does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Required backend (API key, notification permission) is not available.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Filesystem access for export/import failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed in the service layer.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Llm(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Whether this error represents a not-found condition.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this error is a rejected import document.
    pub fn is_malformed_import(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_malformed_import())
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Serialization(e) => Self::Serialization(e),
            CoreError::NotFound(what) => Self::NotFound(what),
            CoreError::InvalidInput(msg) => Self::InvalidInput(msg),
            CoreError::UnknownAction(name) => Self::InvalidInput(format!("unknown action: {name}")),
        }
    }
}

/// Failures of the capture engine.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The operation is not allowed in the engine's current state.
    #[error("cannot {op} while {state}")]
    WrongState { op: &'static str, state: CaptureState },

    /// The action has no conversational capture flow.
    #[error("{0} does not support conversational capture")]
    NotCapturable(ActionId),

    /// The candidate text is not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(String),

    /// The candidate parsed but failed validation.
    #[error("candidate has {} issue(s): {}", .0.len(), .0.join("; "))]
    Invalid(Vec<String>),

    /// The auto-fix reply carried no JSON object.
    #[error("model reply contained no JSON object")]
    NoJsonInReply,

    /// The completion service failed.
    #[error("llm: {0}")]
    Llm(#[from] LlmError),
}
