use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use ad_inventory::task::{self, TaskOutput};
use ad_inventory::InventoryError;

/// Resolve Bolt inventory targets from Active Directory.
///
/// Task parameters are read as a JSON object from stdin (or `--params`);
/// the result is written to stdout as `{"value": [...]}` or
/// `{"_error": {...}}`.
#[derive(Debug, Parser)]
#[command(name = "ad-inventory", version, about)]
struct Cli {
    /// Read task parameters from a file instead of stdin
    #[arg(long, value_name = "FILE", conflicts_with = "sample")]
    params: Option<PathBuf>,

    /// Run against the built-in lab domain instead of reading parameters
    #[arg(long)]
    sample: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Also write logs to <DIR>/ad-inventory.log
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("ad-inventory.log")
        .build(dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}

fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str()));

    // stdout carries the task result, so console logs go to stderr
    let console_layer = fmt::layer().with_writer(io::stderr).with_ansi(false);

    let appender = cli.log_dir.as_deref().map(file_appender).transpose();
    let (appender, file_error) = match appender {
        Ok(appender) => (appender, None),
        Err(e) => (None, Some(e)),
    };

    let (file_layer, guard) = match appender {
        Some(file_appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!("{:#}; logging to stderr only", e);
    }

    guard
}

/// Raw parameter document, or `None` for the built-in sample.
fn read_params(cli: &Cli) -> Result<Option<String>> {
    if cli.sample {
        return Ok(None);
    }

    let input = match &cli.params {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameters from {}", path.display()))?,
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read parameters from stdin")?;
            input
        }
    };

    if input.trim().is_empty() {
        Ok(Some("{}".to_string()))
    } else {
        Ok(Some(input))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging(&cli);

    tracing::info!("ad-inventory {} starting", env!("CARGO_PKG_VERSION"));

    let output = match read_params(&cli) {
        Ok(Some(input)) => task::run_json(&input),
        Ok(None) => task::run(task::sample_options()),
        Err(e) => TaskOutput::from(Err::<Vec<_>, _>(InventoryError::from(e))),
    };

    match serde_json::to_string(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            println!(
                r#"{{"_error":{{"kind":"bolt.plugin/task-error","msg":"Failed to serialize result: {}","details":{{}}}}}}"#,
                e.to_string().replace('"', "'")
            );
            return ExitCode::FAILURE;
        }
    }

    if output.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
