//! PresetDaemon - work-breakdown preset generator
//!
//! CLI entry point for generating, validating, and inspecting presets.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use presetdaemon::cli::{Cli, Command, OutputFormat, parse_answer};
use presetdaemon::config::Config;
use presetdaemon::domain::{PipelineInput, Preset, fallback_preset};
use presetdaemon::llm::create_client;
use presetdaemon::pipeline::PresetPipeline;
use presetdaemon::validation::SchemaValidator;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    // Logs go to stderr so stdout stays clean JSON for piping
    let level = if let Some(s) = cli_log_level {
        match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                tracing::Level::WARN
            }
        }
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!(?level, "setup_logging: initialized");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Generate {
            description,
            user,
            category,
            answers,
            format,
        } => cmd_generate(config, description, user, category, answers, format).await,
        Command::Validate { file } => cmd_validate(&file),
        Command::Fallback { format } => cmd_fallback(format),
    }
}

/// Run the full generation pipeline for one request
async fn cmd_generate(
    config: Config,
    description: String,
    user: String,
    category: Option<String>,
    answers: Vec<String>,
    format: OutputFormat,
) -> Result<()> {
    debug!(%user, answer_count = answers.len(), "cmd_generate: called");
    config.validate()?;

    let mut input = PipelineInput::new(user, description);
    if let Some(category) = category {
        input = input.with_category(category);
    }
    for raw in &answers {
        let (key, value) = parse_answer(raw)?;
        input = input.with_answer(key, value);
    }

    let client = create_client(&config.llm).context("Failed to create LLM client")?;
    let pipeline = PresetPipeline::new(client, config);

    info!(request_id = %input.request_id, "cmd_generate: running pipeline");
    let result = pipeline.run(input).await.context("Pipeline run failed")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => {
            print_preset(&result.preset);
            println!();
            println!(
                "passes: {} | attempts: {} | fallback: {} | {}ms",
                result.metadata.model_passes.join(", "),
                result.metadata.attempts,
                result.metadata.fallback,
                result.metadata.generation_time_ms
            );
        }
    }

    Ok(())
}

/// Check a preset JSON file against the contract
fn cmd_validate(file: &PathBuf) -> Result<()> {
    debug!(?file, "cmd_validate: called");
    let content = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let candidate: serde_json::Value =
        serde_json::from_str(&content).context(format!("{} is not valid JSON", file.display()))?;

    let validator = SchemaValidator::new();
    match validator.validate(&candidate) {
        Ok(()) => {
            println!("{}: valid preset", file.display());
            Ok(())
        }
        Err(errors) => {
            eprintln!("{}: invalid preset", file.display());
            for error in &errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(1);
        }
    }
}

/// Print the static fallback preset
fn cmd_fallback(format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_fallback: called");
    let preset = fallback_preset();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&preset)?),
        OutputFormat::Text => print_preset(&preset),
    }
    Ok(())
}

/// Human-readable preset summary
fn print_preset(preset: &Preset) {
    println!("{}", preset.name);
    println!("{}", preset.short_description);
    println!();
    println!(
        "{} activities, {:.1}h total (confidence {:.2})",
        preset.activities.len(),
        preset.total_hours(),
        preset.confidence
    );
    println!();
    for activity in &preset.activities {
        println!(
            "  [{}] {} - {:.2}h ({})",
            activity.group, activity.title, activity.estimated_hours, activity.priority
        );
    }
}
