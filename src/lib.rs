//! G-code Toolpath Parser
//!
//! A modal G-code interpreter for GRBL/FluidNC style programs.
//!
//! This library provides:
//! - Line parsing: comments, words, G/M code classification
//! - A modal state machine (position, units, plane, spindle, coolant, ...)
//! - Toolpath segments with length and time estimates
//! - Program statistics and an error log
//! - Configuration management

pub mod cli;
pub mod config;
pub mod core;
pub mod gcode;
pub mod parser;
pub mod validation;

// Re-exports for clean public API
pub use config::{Config, ParserConfig};
pub use core::{GCodeState, SegmentType, Statistics, ToolpathSegment};
pub use gcode::{GCodeParser, ParseObserver, SegmentStream};
pub use parser::{
    CommandType, GCodeCommand, ParsedLine, Position, command_type_to_string, is_modal_command,
    is_motion_command,
};
pub use validation::{ParseError, Severity};
