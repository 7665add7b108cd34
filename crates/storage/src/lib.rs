//! Storage layer for actionlog
//!
//! Everything persists through a string key-value interface. Production uses a
//! single-table SQLite database; tests substitute the in-memory backend.

mod error;
mod kv;
mod migrations;
mod profile_store;
mod record_store;
mod settings_store;
mod sqlite;
#[cfg(test)]
mod tests;

pub use error::{Result, StorageError};
pub use kv::{KeyValueStore, MemoryKv};
pub use profile_store::ProfileStore;
pub use record_store::RecordStore;
pub use settings_store::{LlmSettings, SettingsStore};
pub use sqlite::SqliteKv;
