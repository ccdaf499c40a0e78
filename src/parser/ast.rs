//! Parsed G-code structures
//!
//! Positions, commands and parsed lines, plus the step that turns a line's
//! words into commands.

use serde::Serialize;

use crate::parser::command::{
    CommandType, classify_gcode, classify_mcode, consumes_axis_words, is_arc_command,
};
use crate::parser::lexer::{self, LexError, LineWords};

/// A six-axis position with every coordinate known
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            a: 0.0,
            b: 0.0,
            c: 0.0,
        }
    }

    /// Euclidean distance over X, Y and Z only
    pub fn distance_xyz(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Axis words carried by a command; `None` means the axis was not given
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AxisWords {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub c: Option<f64>,
}

impl AxisWords {
    /// True if at least one axis is present
    pub fn any(&self) -> bool {
        self.any_xyz() || self.a.is_some() || self.b.is_some() || self.c.is_some()
    }

    pub fn any_xyz(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
    }

    /// Set present axes of `base` to the given values
    pub fn apply_absolute(&self, base: &Position) -> Position {
        Position {
            x: self.x.unwrap_or(base.x),
            y: self.y.unwrap_or(base.y),
            z: self.z.unwrap_or(base.z),
            a: self.a.unwrap_or(base.a),
            b: self.b.unwrap_or(base.b),
            c: self.c.unwrap_or(base.c),
        }
    }

    /// Add present axes to `base`
    pub fn apply_incremental(&self, base: &Position) -> Position {
        Position {
            x: base.x + self.x.unwrap_or(0.0),
            y: base.y + self.y.unwrap_or(0.0),
            z: base.z + self.z.unwrap_or(0.0),
            a: base.a + self.a.unwrap_or(0.0),
            b: base.b + self.b.unwrap_or(0.0),
            c: base.c + self.c.unwrap_or(0.0),
        }
    }
}

/// Arc centre offsets (I/J/K) or radius (R)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ArcParameters {
    pub i: Option<f64>,
    pub j: Option<f64>,
    pub k: Option<f64>,
    pub r: Option<f64>,
}

impl ArcParameters {
    /// I or J given
    pub fn has_center_offset(&self) -> bool {
        self.i.is_some() || self.j.is_some()
    }

    pub fn has_radius(&self) -> bool {
        self.r.is_some()
    }
}

/// One parsed instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GCodeCommand {
    pub command_type: CommandType,
    pub position: AxisWords,
    pub arc: ArcParameters,
    pub feed_rate: Option<f64>,
    pub spindle_speed: Option<f64>,
    pub dwell_time: Option<f64>,
    pub retract_height: Option<f64>,
    pub peck_increment: Option<f64>,
    pub tool_number: Option<i32>,
    pub line_number: usize,
    pub original_line: String,
    pub comment: String,
}

impl GCodeCommand {
    pub fn new(command_type: CommandType, line_number: usize, original_line: &str) -> Self {
        Self {
            command_type,
            position: AxisWords::default(),
            arc: ArcParameters::default(),
            feed_rate: None,
            spindle_speed: None,
            dwell_time: None,
            retract_height: None,
            peck_increment: None,
            tool_number: None,
            line_number,
            original_line: original_line.to_string(),
            comment: String::new(),
        }
    }

    /// Bind one word to the field it means for this command type
    ///
    /// `R` is the arc radius on G2/G3 and the retract height everywhere else.
    /// Letters with no meaning here are ignored.
    pub fn apply_word(&mut self, letter: char, value: f64) {
        match letter {
            'X' => self.position.x = Some(value),
            'Y' => self.position.y = Some(value),
            'Z' => self.position.z = Some(value),
            'A' => self.position.a = Some(value),
            'B' => self.position.b = Some(value),
            'C' => self.position.c = Some(value),
            'I' => self.arc.i = Some(value),
            'J' => self.arc.j = Some(value),
            'K' => self.arc.k = Some(value),
            'R' if is_arc_command(self.command_type) => self.arc.r = Some(value),
            'R' => self.retract_height = Some(value),
            'F' => self.feed_rate = Some(value),
            'S' => self.spindle_speed = Some(value),
            'P' => self.dwell_time = Some(value),
            'Q' => self.peck_increment = Some(value),
            'T' => self.tool_number = Some(value.trunc() as i32),
            _ => {}
        }
    }
}

/// A problem found while parsing a single line
#[derive(Debug, Clone, PartialEq)]
pub struct LineIssue {
    pub message: String,
    /// Marks the line as an error line in the statistics
    pub marks_line: bool,
}

/// Result of parsing one line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLine {
    pub commands: Vec<GCodeCommand>,
    pub comment: String,
    pub original_line: String,
    pub line_number: usize,
    pub has_error: bool,
    pub error_message: String,
    /// Everything that should be reported, in order of discovery
    pub issues: Vec<LineIssue>,
}

impl ParsedLine {
    fn issue(&mut self, message: String, marks_line: bool) {
        if marks_line {
            self.has_error = true;
            self.error_message.clone_from(&message);
        }
        self.issues.push(LineIssue {
            message,
            marks_line,
        });
    }
}

/// Parse one line without touching any parser state
///
/// `motion_mode` is the active modal motion, used when the line carries axis
/// words but no G or M code. With `strict` set, unknown codes are dropped
/// instead of being emitted as [`CommandType::Unknown`].
///
/// Non-axis words apply to every command on the line. X/Y/Z/A/B/C apply
/// only to commands that take axis arguments (motion, canned cycles, G28,
/// G30, G92) when one is present, and to every command otherwise, so
/// `G91 G1 X5` moves once while `G91 X5` still moves.
pub fn parse_line(
    line: &str,
    line_number: usize,
    motion_mode: CommandType,
    strict: bool,
) -> ParsedLine {
    let mut result = ParsedLine {
        original_line: line.to_string(),
        line_number,
        comment: lexer::extract_comment(line),
        ..ParsedLine::default()
    };

    let cleaned = lexer::clean_line(line);
    if cleaned.is_empty() {
        return result;
    }

    let words = match lexer::extract_words(&cleaned) {
        Ok(words) => words,
        Err(err) => {
            let LexError::InvalidNumber { missing, .. } = &err;
            for letter in missing {
                result.issue(format!("Missing value for {letter}"), true);
            }
            result.issue(format!("Parse error: {err}"), true);
            return result;
        }
    };

    for letter in &words.missing_values {
        result.issue(format!("Missing value for {letter}"), true);
    }

    let mut types = Vec::new();
    for &code in &words.gcodes {
        match classify_gcode(code) {
            Some(command_type) => types.push(command_type),
            None => {
                result.issue(format!("Unknown G-code: G{code}"), false);
                if !strict {
                    types.push(CommandType::Unknown);
                }
            }
        }
    }
    for &code in &words.mcodes {
        match classify_mcode(code) {
            Some(command_type) => types.push(command_type),
            None => {
                result.issue(format!("Unknown M-code: M{code}"), false);
                if !strict {
                    types.push(CommandType::Unknown);
                }
            }
        }
    }

    if words.gcodes.is_empty() && words.mcodes.is_empty() && words.has_axis_words() {
        types.push(motion_mode);
    }

    let axis_owner_present = types.iter().any(|t| consumes_axis_words(*t));
    let commands: Vec<GCodeCommand> = types
        .into_iter()
        .map(|command_type| {
            let takes_axes = !axis_owner_present || consumes_axis_words(command_type);
            build_command(command_type, &words, takes_axes, &result)
        })
        .collect();
    result.commands = commands;

    result
}

fn build_command(
    command_type: CommandType,
    words: &LineWords,
    takes_axes: bool,
    line: &ParsedLine,
) -> GCodeCommand {
    let mut command = GCodeCommand::new(command_type, line.line_number, &line.original_line);
    command.comment.clone_from(&line.comment);

    for (&letter, &value) in &words.parameters {
        if !takes_axes && matches!(letter, 'X' | 'Y' | 'Z' | 'A' | 'B' | 'C') {
            continue;
        }
        command.apply_word(letter, value);
    }

    command
}
