//! PawTrack CLI - Command-line interface for the PawTrack engine
//!
//! Commands:
//! - replay: Run recorded position samples through the engine (batch mode)
//! - score: Derive final metrics and a health label from samples
//! - schema: Print input/output schema information
//! - doctor: Diagnose engine configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pawtrack::activity::TimeAttribution;
use pawtrack::replay::{replay, ReplayConfig, ReplayOutput};
use pawtrack::types::{PositionSample, RecordSource};
use pawtrack::{PAWTRACK_VERSION, PRODUCER_NAME};

/// PawTrack - GPS activity tracking and health scoring for fostered pets
#[derive(Parser)]
#[command(name = "pawtrack")]
#[command(version = PAWTRACK_VERSION)]
#[command(about = "Turn position samples into tracking records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run recorded position samples through the engine (batch mode)
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Tracked subject identifier
        #[arg(long)]
        subject: String,

        /// Owning front-end for record tagging
        #[arg(long, default_value = "user")]
        source: SourceTag,

        /// Sample-time seconds between emitted records
        #[arg(long, default_value = "30")]
        emit_every: f64,

        /// Attribute elapsed sample time instead of a fixed 30 s quantum
        #[arg(long)]
        elapsed_attribution: bool,
    },

    /// Derive final metrics and a health label from samples
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },

    /// Diagnose engine configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one sample per line)
    Ndjson,
    /// JSON array of samples
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one tracking record per line)
    Ndjson,
    /// JSON object with records, metrics, and label
    Json,
    /// Pretty-printed JSON object
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceTag {
    User,
    Admin,
}

impl From<SourceTag> for RecordSource {
    fn from(tag: SourceTag) -> Self {
        match tag {
            SourceTag::User => RecordSource::User,
            SourceTag::Admin => RecordSource::Admin,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (position samples)
    Input,
    /// Output schema (tracking records)
    Output,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliErrorReport::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            input_format,
            output_format,
            subject,
            source,
            emit_every,
            elapsed_attribution,
        } => cmd_replay(
            &input,
            &output,
            input_format,
            output_format,
            &subject,
            source,
            emit_every,
            elapsed_attribution,
        ),

        Commands::Score {
            input,
            input_format,
            json,
        } => cmd_score(&input, input_format, json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),

        Commands::Doctor { json } => cmd_doctor(json),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_replay(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    subject: &str,
    source: SourceTag,
    emit_every: f64,
    elapsed_attribution: bool,
) -> Result<(), CliError> {
    let samples = read_samples(input, input_format)?;
    if samples.is_empty() {
        return Err(CliError::NoSamples);
    }

    let mut config =
        ReplayConfig::new(subject, source.into()).with_emit_every_secs(emit_every.max(1.0));
    if elapsed_attribution {
        config = config.with_attribution(TimeAttribution::Elapsed);
    }

    let result = replay(&samples, &config);
    let rendered = format_output(&result, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{rendered}");
    } else {
        fs::write(output, rendered)?;
    }

    Ok(())
}

fn cmd_score(input: &Path, input_format: InputFormat, json: bool) -> Result<(), CliError> {
    let samples = read_samples(input, input_format)?;
    if samples.is_empty() {
        return Err(CliError::NoSamples);
    }

    let result = replay(&samples, &ReplayConfig::new("score", RecordSource::User));
    let metrics = &result.metrics;

    if json {
        let report = serde_json::json!({
            "samples": samples.len(),
            "total_distance_m": metrics.total_distance_m,
            "average_speed_mps": metrics.average_speed_mps,
            "active_seconds": metrics.active_seconds,
            "rest_seconds": metrics.rest_seconds,
            "activity_ratio": metrics.activity_ratio(),
            "health": result.health,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Activity Report");
        println!("===============");
        println!("Samples:        {}", samples.len());
        println!("Distance:       {:.1} m", metrics.total_distance_m);
        println!("Average speed:  {:.2} m/s", metrics.average_speed_mps);
        println!(
            "Active/rest:    {:.0} s / {:.0} s",
            metrics.active_seconds, metrics.rest_seconds
        );
        println!("Health:         {}", result.health.as_str());
    }

    Ok(())
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), CliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Input Schema: position samples");
            println!();
            println!("One sample per observation, NDJSON or JSON array:");
            println!("  latitude     signed degrees");
            println!("  longitude    signed degrees");
            println!("  accuracy     estimated horizontal error in meters");
            println!("  observed_at  RFC 3339 timestamp, non-decreasing");
        }
        SchemaType::Output => {
            println!("Output Schema: tracking records");
            println!();
            println!("One record per emission interval:");
            println!("  subject_id         tracked subject identifier");
            println!("  location           human-readable coordinates (6 decimal places)");
            println!("  health_status      monitoring | poor | fair | good | excellent");
            println!("  activity_level     low | moderate | high");
            println!("  phone_coordinates  raw lat,lng pair (auto captures only)");
            println!("  tracking_method    phone_gps_auto | admin_gps_auto |");
            println!("                     manual_record | admin_manual_record");
            println!("  notes              metrics summary text");
        }
    }

    Ok(())
}

fn cmd_doctor(json: bool) -> Result<(), CliError> {
    let stdin_mode = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (interactive mode)"
    } else {
        "stdin is a pipe (streaming mode ready)"
    };

    if json {
        let report = serde_json::json!({
            "producer": PRODUCER_NAME,
            "version": PAWTRACK_VERSION,
            "checks": [
                { "name": "version", "status": "ok", "message": PAWTRACK_VERSION },
                { "name": "stdin", "status": "ok", "message": stdin_mode },
            ],
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("PawTrack Doctor Report");
        println!("======================");
        println!("Producer: {PRODUCER_NAME}");
        println!("Version:  {PAWTRACK_VERSION}");
        println!();
        println!("  [OK] version: {PAWTRACK_VERSION}");
        println!("  [OK] stdin: {stdin_mode}");
    }

    Ok(())
}

// Helper functions

fn read_samples(input: &Path, format: InputFormat) -> Result<Vec<PositionSample>, CliError> {
    let data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    match format {
        InputFormat::Ndjson => {
            let mut samples = Vec::new();
            for (number, line) in data.lines().enumerate() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let sample: PositionSample = serde_json::from_str(trimmed).map_err(|e| {
                    CliError::Parse(format!("line {}: {e}", number + 1))
                })?;
                samples.push(sample);
            }
            Ok(samples)
        }
        InputFormat::Json => {
            serde_json::from_str(&data).map_err(|e| CliError::Parse(e.to_string()))
        }
    }
}

fn format_output(result: &ReplayOutput, format: &OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in &result.records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(result)?),
    }
}

// Error types

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Json(serde_json::Error),
    Parse(String),
    NoSamples,
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliErrorReport {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliError> for CliErrorReport {
    fn from(e: CliError) -> Self {
        match e {
            CliError::Io(e) => CliErrorReport {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CliError::Json(e) => CliErrorReport {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CliError::Parse(msg) => CliErrorReport {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'pawtrack schema input' for the sample format".to_string()),
            },
            CliError::NoSamples => CliErrorReport {
                code: "NO_SAMPLES".to_string(),
                message: "No position samples found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
        }
    }
}
