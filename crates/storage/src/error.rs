//! Typed error enum for the storage layer.
//!
//! Callers match on specific failure modes (malformed import, duplicate id,
//! backend failure) instead of downcasting opaque boxes.

use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Import payload is not an object with a `sessions` array.
    #[error("malformed import: {0}")]
    MalformedImport(String),

    /// A record with the same id already exists.
    #[error("duplicate: record with id {0} already exists")]
    Duplicate(String),

    /// SQL / connection failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection pool exhausted or misconfigured.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Stored data could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-database backend failure (e.g. a poisoned in-memory lock).
    #[error("backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Pool(_) => true,
            Self::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    /// Whether this error rejects an import payload.
    pub fn is_malformed_import(&self) -> bool {
        matches!(self, Self::MalformedImport(_))
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
