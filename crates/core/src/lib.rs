//! Core types and traits for actionlog
//!
//! This crate contains domain types shared across all other crates.

mod action;
pub mod constants;
mod env_config;
mod error;
mod json_utils;
mod profile;
mod schedule;
mod session;

pub use action::*;
pub use env_config::env_parse_with_default;
pub use error::*;
pub use json_utils::{extract_first_json, extract_trailing_json, strip_markdown_json};
pub use profile::*;
pub use schedule::*;
pub use session::*;
