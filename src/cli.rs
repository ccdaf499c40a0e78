//! Command-line front end
//!
//! Parses one G-code file and prints either a text summary or the full
//! result as JSON.

use std::fmt::Write as _;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::config::{Config, OutputFormat};
use crate::core::{GCodeState, Statistics, ToolpathSegment};
use crate::gcode::GCodeParser;
use crate::validation::ParseError;

/// Everything the JSON report contains
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub success: bool,
    pub state: &'a GCodeState,
    pub statistics: &'a Statistics,
    pub errors: &'a [ParseError],
    pub toolpath: &'a [ToolpathSegment],
}

impl<'a> Report<'a> {
    pub fn new(parser: &'a GCodeParser, success: bool) -> Self {
        Self {
            success,
            state: parser.state(),
            statistics: parser.statistics(),
            errors: parser.errors(),
            toolpath: parser.toolpath(),
        }
    }
}

/// Run the command-line tool
pub fn run() -> Result<()> {
    let config = Config::from_args_and_env()?;

    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .try_init();

    let mut parser = GCodeParser::with_config(config.parser.clone());
    let success = parser.parse_file(&config.file);
    log::info!(
        "Parsed {}: {} lines, {} segments, {} errors",
        config.file.display(),
        parser.statistics().total_lines,
        parser.toolpath().len(),
        parser.errors().len()
    );

    match config.format {
        OutputFormat::Text => print!("{}", render_text(&parser, success)),
        OutputFormat::Json => println!("{}", render_json(&parser, success)?),
    }

    if !success {
        bail!("{} did not parse cleanly", config.file.display());
    }

    Ok(())
}

/// Pretty-printed JSON of the parse result
pub fn render_json(parser: &GCodeParser, success: bool) -> Result<String> {
    serde_json::to_string_pretty(&Report::new(parser, success))
        .context("Failed to serialize parse report")
}

/// Human readable summary of the parse result
pub fn render_text(parser: &GCodeParser, success: bool) -> String {
    let stats = parser.statistics();
    let state = parser.state();
    let mut out = String::new();

    let _ = writeln!(out, "Result:        {}", if success { "ok" } else { "failed" });
    let _ = writeln!(
        out,
        "Lines:         {} total, {} commands, {} comments, {} errors",
        stats.total_lines, stats.command_lines, stats.comment_lines, stats.error_lines
    );
    let _ = writeln!(
        out,
        "Moves:         {} rapid, {} linear, {} arc",
        stats.rapid_moves, stats.linear_moves, stats.arc_moves
    );
    let _ = writeln!(
        out,
        "Distance:      {:.3} total ({:.3} rapid, {:.3} cutting)",
        stats.total_distance, stats.rapid_distance, stats.cutting_distance
    );
    let _ = writeln!(out, "Est. time:     {}", format_duration(stats.estimated_time));
    let _ = writeln!(out, "Units:         {:?}", state.units);

    if let Some((min, max)) = stats.bounds() {
        let _ = writeln!(
            out,
            "Bounds:        X {:.3}..{:.3}  Y {:.3}..{:.3}  Z {:.3}..{:.3}",
            min.x, max.x, min.y, max.y, min.z, max.z
        );
    }

    if !stats.tools_used.is_empty() {
        let tools: Vec<String> = stats.tools_used.iter().map(|t| format!("T{t}")).collect();
        let _ = writeln!(
            out,
            "Tools:         {} ({} changes)",
            tools.join(", "),
            stats.tool_changes
        );
    }

    for error in parser.errors() {
        let _ = writeln!(out, "{:?}: {}", error.severity, error);
    }

    out
}

/// `h:mm:ss` for the given number of seconds
fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}
