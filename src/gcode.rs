//! G-code program parser.
//!
//! [`GCodeParser`] runs every line of a program through the line parser,
//! applies each command to the modal state, and collects the toolpath,
//! statistics and error log of the program.
//!
//! Consumers that want results while parsing is in progress can either
//! install a [`ParseObserver`] or pull segments lazily from a
//! [`SegmentStream`].

use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc;

use crate::config::ParserConfig;
use crate::core::{GCodeState, Statistics, ToolpathSegment, generate_segment};
use crate::parser::{self, GCodeCommand, ParsedLine, Position};
use crate::validation::{ParseError, Severity, validate_command};

/// Hooks called synchronously while a program is parsed
///
/// Implementations must not call back into the parser.
pub trait ParseObserver {
    /// Called once per input line before it is parsed. `total_lines` is 0
    /// when the total is not known in advance.
    fn on_progress(&mut self, _current_line: usize, _total_lines: usize) {}

    /// Called for every entry appended to the error log
    fn on_error(&mut self, _error: &ParseError) {}

    /// Called for every generated toolpath segment
    fn on_segment(&mut self, _segment: &ToolpathSegment) {}
}

/// Forwards segments over a channel; a dropped receiver is ignored
impl ParseObserver for mpsc::Sender<ToolpathSegment> {
    fn on_segment(&mut self, segment: &ToolpathSegment) {
        let _ = self.send(segment.clone());
    }
}

/// Parser for whole G-code programs
pub struct GCodeParser {
    state: GCodeState,
    toolpath: Vec<ToolpathSegment>,
    statistics: Statistics,
    errors: Vec<ParseError>,
    config: ParserConfig,
    /// Keep generated segments in `toolpath`; off when streaming
    retain_toolpath: bool,
    observer: Option<Box<dyn ParseObserver>>,
}

impl fmt::Debug for GCodeParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GCodeParser")
            .field("state", &self.state)
            .field("segments", &self.toolpath.len())
            .field("errors", &self.errors.len())
            .field("config", &self.config)
            .field("has_observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for GCodeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GCodeParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            state: GCodeState::new(),
            toolpath: Vec::new(),
            statistics: Statistics::new(),
            errors: Vec::new(),
            config,
            retain_toolpath: true,
            observer: None,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn set_strict_mode(&mut self, strict: bool) {
        self.config.strict_mode = strict;
    }

    pub fn set_max_error_count(&mut self, max_errors: usize) {
        self.config.max_errors = max_errors;
    }

    pub fn enable_statistics(&mut self, enable: bool) {
        self.config.collect_statistics = enable;
    }

    pub fn enable_toolpath_generation(&mut self, enable: bool) {
        self.config.generate_toolpath = enable;
    }

    /// Install an observer, replacing any previous one
    pub fn set_observer(&mut self, observer: impl ParseObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Remove and return the installed observer
    pub fn take_observer(&mut self) -> Option<Box<dyn ParseObserver>> {
        self.observer.take()
    }

    pub fn state(&self) -> &GCodeState {
        &self.state
    }

    pub fn toolpath(&self) -> &[ToolpathSegment] {
        &self.toolpath
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Clear state, toolpath, statistics and error log
    pub fn reset_state(&mut self) {
        self.state.reset();
        self.statistics.reset();
        self.toolpath.clear();
        self.errors.clear();
    }

    /// Read a whole file and parse it
    ///
    /// An unreadable file leaves a single `Fatal` entry in the error log.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => self.parse_string(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                self.reset_state();
                log::debug!("Reading {} failed: {}", path.display(), e);
                self.report_error(
                    format!("Cannot open file: {}", path.display()),
                    0,
                    "",
                    Severity::Fatal,
                );
                false
            }
        }
    }

    /// Parse a complete program
    ///
    /// Returns true when the error log is empty, or when not in strict mode
    /// and no line was classified as an error line. Validation failures are
    /// logged but do not make a line an error line.
    pub fn parse_string(&mut self, gcode: &str) -> bool {
        self.reset_state();

        let total_lines = gcode.lines().count();
        log::debug!("Parsing {} lines of G-code", total_lines);

        for (idx, line) in gcode.lines().enumerate() {
            if self.should_halt() {
                log::debug!("Parsing halted before line {}", idx + 1);
                break;
            }
            self.process_line(line, idx + 1, total_lines);
        }

        log::debug!(
            "Parsed {} lines: {} segments, {} errors",
            self.statistics.total_lines,
            self.toolpath.len(),
            self.errors.len()
        );

        self.is_success()
    }

    /// Parse one line against the current modal state without applying it
    ///
    /// Problems found on the line are appended to the error log.
    pub fn parse_line(&mut self, line: &str, line_number: usize) -> ParsedLine {
        let parsed = parser::parse_line(
            line,
            line_number,
            self.state.motion_mode,
            self.config.strict_mode,
        );

        for issue in &parsed.issues {
            self.report_error(issue.message.clone(), line_number, line, Severity::ParseError);
        }

        parsed
    }

    /// Outcome of the last parse, using the same rule as [`Self::parse_string`]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() || (!self.config.strict_mode && self.statistics.error_lines == 0)
    }

    pub fn transform_to_work_coordinates(&self, machine: &Position) -> Position {
        self.state.transform_to_work_coordinates(machine)
    }

    pub fn transform_to_machine_coordinates(&self, work: &Position) -> Position {
        self.state.transform_to_machine_coordinates(work)
    }

    fn should_halt(&self) -> bool {
        self.errors.len() >= self.config.max_errors
            || (self.config.strict_mode && !self.errors.is_empty())
    }

    /// Parse and apply one line, returning the segments it produced
    fn process_line(
        &mut self,
        line: &str,
        line_number: usize,
        total_lines: usize,
    ) -> Vec<ToolpathSegment> {
        self.state.line_number = line_number;
        if let Some(observer) = self.observer.as_mut() {
            observer.on_progress(line_number, total_lines);
        }

        let parsed = self.parse_line(line, line_number);

        self.statistics.total_lines += 1;
        if parsed.has_error {
            self.statistics.error_lines += 1;
        } else if !parsed.commands.is_empty() {
            self.statistics.command_lines += 1;
        } else if !parsed.comment.is_empty() {
            self.statistics.comment_lines += 1;
        }

        parsed
            .commands
            .iter()
            .filter_map(|command| self.process_command(command))
            .collect()
    }

    fn process_command(&mut self, command: &GCodeCommand) -> Option<ToolpathSegment> {
        let start = self.state.current_position;
        let target = self.state.resolve_target(&command.position);

        self.state.update_modal_state(command);

        let segment = if self.config.generate_toolpath || self.config.collect_statistics {
            generate_segment(command, start, target, &self.state)
        } else {
            None
        };

        if self.config.generate_toolpath {
            if let Some(segment) = &segment {
                log::trace!(
                    "line {}: {:?} segment, length {:.3}",
                    command.line_number,
                    segment.segment_type,
                    segment.length
                );
                if self.retain_toolpath {
                    self.toolpath.push(segment.clone());
                }
                if let Some(observer) = self.observer.as_mut() {
                    observer.on_segment(segment);
                }
            }
        }

        if self.config.collect_statistics {
            self.statistics
                .record_command(command, &self.state, segment.as_ref());
        }

        if let Err(message) = validate_command(command) {
            self.report_error(
                message,
                command.line_number,
                &command.original_line,
                Severity::ParseError,
            );
        }

        segment.filter(|_| self.config.generate_toolpath)
    }

    fn report_error(&mut self, message: String, line_number: usize, line: &str, severity: Severity) {
        match severity {
            Severity::Fatal => log::error!("G-code error at line {}: {}", line_number, message),
            Severity::ParseError | Severity::Warning => {
                log::warn!("G-code parse error at line {}: {}", line_number, message)
            }
        }

        let error = ParseError {
            line_number,
            line: line.to_string(),
            message,
            severity,
        };

        if let Some(observer) = self.observer.as_mut() {
            observer.on_error(&error);
        }

        self.errors.push(error);
    }
}

/// Lazy iterator over the toolpath of a program read from a `BufRead`
///
/// Lines are read and parsed only as segments are requested, and segments
/// are not retained by the parser. Invalid UTF-8 is replaced rather than
/// rejected, as in [`GCodeParser::parse_file`]. The error cap and strict mode end the
/// stream the same way they end [`GCodeParser::parse_string`].
pub struct SegmentStream<R: BufRead> {
    reader: R,
    parser: GCodeParser,
    line_buffer: Vec<u8>,
    line_number: usize,
    pending: VecDeque<ToolpathSegment>,
    done: bool,
}

impl<R: BufRead> SegmentStream<R> {
    pub fn new(reader: R, config: ParserConfig) -> Self {
        let mut parser = GCodeParser::with_config(ParserConfig {
            generate_toolpath: true,
            ..config
        });
        parser.retain_toolpath = false;

        Self {
            reader,
            parser,
            line_buffer: Vec::new(),
            line_number: 0,
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Parser state so far, including statistics and errors
    pub fn parser(&self) -> &GCodeParser {
        &self.parser
    }

    /// Stop streaming and hand back the parser
    pub fn finish(self) -> GCodeParser {
        self.parser
    }
}

impl<R: BufRead> Iterator for SegmentStream<R> {
    type Item = ToolpathSegment;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(segment) = self.pending.pop_front() {
                return Some(segment);
            }
            if self.done || self.parser.should_halt() {
                self.done = true;
                return None;
            }

            self.line_buffer.clear();
            match self.reader.read_until(b'\n', &mut self.line_buffer) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_number += 1;
                    let text = String::from_utf8_lossy(&self.line_buffer);
                    let line = text.trim_end_matches(['\n', '\r']);
                    let segments = self.parser.process_line(line, self.line_number, 0);
                    self.pending.extend(segments);
                }
                Err(e) => {
                    self.done = true;
                    self.parser.report_error(
                        format!("Read error: {}", e),
                        self.line_number + 1,
                        "",
                        Severity::Fatal,
                    );
                }
            }
        }
    }
}
