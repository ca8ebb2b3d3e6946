//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use eyre::{Result, eyre};
use std::path::PathBuf;
use tracing::debug;

/// PresetDaemon - two-pass work-breakdown preset generator
#[derive(Parser)]
#[command(
    name = "pd",
    about = "Generates estimable work-breakdown presets from project descriptions",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a preset from a project description
    Generate {
        /// Free-text project description
        description: String,

        /// User identifier attached to the request
        #[arg(short, long, default_value = "cli")]
        user: String,

        /// Technology category hint
        #[arg(long)]
        category: Option<String>,

        /// Structured answer as key=value (repeatable)
        #[arg(short, long = "answer", value_name = "KEY=VALUE")]
        answers: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Validate a preset JSON file against the preset contract
    Validate {
        /// Path to a preset JSON file
        file: PathBuf,
    },

    /// Print the static fallback preset
    Fallback {
        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Parse one `--answer key=value` argument
pub fn parse_answer(raw: &str) -> Result<(String, String)> {
    debug!(%raw, "parse_answer: called");
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| eyre!("Invalid answer '{}': expected key=value", raw))?;
    if key.trim().is_empty() {
        return Err(eyre!("Invalid answer '{}': key must not be empty", raw));
    }
    Ok((key.trim().to_string(), value.trim().to_string()))
}
