//! Service layer for actionlog
//!
//! Centralizes the journaling flows between the CLI and storage/llm.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]
#![allow(clippy::let_underscore_must_use, reason = "fmt::Write into a String cannot fail")]

pub mod capture;
mod chat_service;
pub mod error;
mod history_service;
mod records;
pub mod scheduler;
mod weight_log;

#[cfg(test)]
mod history_tests;
#[cfg(test)]
mod test_support;

pub use capture::{CaptureEngine, CaptureState, SaveCallback, TurnOutcome};
pub use chat_service::ChatService;
pub use error::{CaptureError, ServiceError};
pub use history_service::{HistoryFilter, HistoryService, summary_line};
pub use records::{refinement_patch, session_from_payload};
pub use scheduler::{
    NativeAlarm, NotificationPlatform, PlatformEvent, ReminderRequest, Scheduler,
    TokioTimerPlatform,
};
pub use weight_log::{WeightLog, WeightTrend};
