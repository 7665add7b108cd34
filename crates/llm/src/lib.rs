//! Completion-service client and prompt builder for actionlog

mod ai_types;
mod client;
mod completion;
mod error;
pub mod prompts;

#[cfg(test)]
mod retry_tests;
#[cfg(test)]
mod tests;

pub use client::{LlmClient, MAX_OUTPUT_LEN, truncate};
pub use completion::CompletionService;
pub use error::LlmError;
pub use prompts::{Role, Turn};
