//! Validation Engine
//!
//! Per-command validation, kept apart from parsing and state handling.

pub mod engine;

pub use engine::{ParseError, Severity, validate_command};
