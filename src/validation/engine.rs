//! Validation Engine
//!
//! Per-command checks and the error log entry type shared by the parser.

use serde::Serialize;

use crate::parser::{CommandType, GCodeCommand};

/// Severity of a logged problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Advisory only
    Warning,
    /// A line or command is malformed; parsing continues
    ParseError,
    /// Parsing could not proceed at all
    Fatal,
}

/// One entry of the error log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    pub line_number: usize,
    pub line: String,
    pub message: String,
    pub severity: Severity,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line_number, self.message)
    }
}

/// Check the invariants of one command
///
/// Returns the message describing the first violation found.
pub fn validate_command(command: &GCodeCommand) -> Result<(), String> {
    match command.command_type {
        CommandType::CwArc | CommandType::CcwArc => {
            let arc = &command.arc;
            if !arc.has_center_offset() && !arc.has_radius() {
                return Err("Arc command missing I/J or R parameter".to_string());
            }
            if arc.has_radius() && arc.has_center_offset() {
                return Err("Arc command cannot have both R and I/J parameters".to_string());
            }
        }
        CommandType::Dwell => {
            if !command.dwell_time.is_some_and(|p| p >= 0.0) {
                return Err("Dwell command missing P parameter".to_string());
            }
        }
        _ => {}
    }

    Ok(())
}
