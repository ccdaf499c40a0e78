//! Configuration management for the G-code toolpath parser.
//!
//! Handles:
//! - Parser options, loadable from a TOML file
//! - Command-line argument parsing
//! - Merging file settings with command-line overrides

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Default per-parse error cap
pub const DEFAULT_MAX_ERRORS: usize = 100;

/// Options set on a parser before parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Reject unknown codes and stop at the first reported error
    pub strict_mode: bool,
    /// Stop parsing once this many errors have been logged
    pub max_errors: usize,
    pub collect_statistics: bool,
    pub generate_toolpath: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            max_errors: DEFAULT_MAX_ERRORS,
            collect_statistics: true,
            generate_toolpath: true,
        }
    }
}

impl ParserConfig {
    /// Parse options from TOML text; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse parser configuration")
    }

    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Output format of the command-line report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Command-line arguments for the G-code toolpath parser
#[derive(Debug, Parser)]
#[command(name = "gcode-toolpath")]
#[command(about = "Parse a G-code program and report its toolpath and statistics")]
#[command(version)]
pub struct Args {
    /// G-code file to parse
    pub file: PathBuf,

    /// Reject unknown codes and stop at the first error
    #[arg(long)]
    pub strict: bool,

    /// Stop after this many errors
    #[arg(long, value_name = "N")]
    pub max_errors: Option<usize>,

    /// Skip statistics collection
    #[arg(long)]
    pub no_statistics: bool,

    /// Skip toolpath generation
    #[arg(long)]
    pub no_toolpath: bool,

    /// Parser configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level for the parser
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub file: PathBuf,
    pub parser: ParserConfig,
    pub format: OutputFormat,
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let mut parser = match &args.config {
            Some(path) => ParserConfig::load(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => ParserConfig::load(&path)?,
                None => ParserConfig::default(),
            },
        };

        if args.strict {
            parser.strict_mode = true;
        }
        if let Some(max_errors) = args.max_errors {
            parser.max_errors = max_errors;
        }
        if args.no_statistics {
            parser.collect_statistics = false;
        }
        if args.no_toolpath {
            parser.generate_toolpath = false;
        }

        Ok(Config {
            file: args.file,
            parser,
            format: args.format,
            log_level: args.log_level,
        })
    }
}

/// `<config dir>/gcode-toolpath/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gcode-toolpath").join("config.toml"))
}
