//! GCode Parser
//!
//! Line-level parsing: comment extraction, tokenization, classification and
//! binding of words to commands. Holds no state between lines; the modal
//! motion used for bare axis lines is passed in by the caller.

pub mod ast;
pub mod command;
pub mod lexer;

pub use ast::{
    ArcParameters, AxisWords, GCodeCommand, LineIssue, ParsedLine, Position, parse_line,
};
pub use command::{
    CommandType, classify_gcode, classify_mcode, command_type_to_string, is_modal_command,
    is_motion_command,
};
pub use lexer::{LexError, LineWords, clean_line, extract_comment, extract_words};
