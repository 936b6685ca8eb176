//! folio-cli: Render a dashboard capture into a paginated PDF report.
//!
//! Runs the export pipeline outside the browser.  A PNG (or JPEG, BMP,
//! WebP) screenshot of the dashboard stands in for the live page; the
//! report lands in the output directory under the same generated name
//! the browser download would use.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin folio-cli -- [OPTIONS] <CAPTURE_PNG>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod host;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local};
use clap::{Parser, ValueEnum};
use folio_pipeline::{ColorMode, ExportConfig, ExportGuard, ExportOutcome, ExportRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::host::FileEnvironment;

/// Turn a dashboard screenshot into a financial dashboard PDF report.
#[derive(Parser)]
#[command(name = "folio-cli", version)]
struct Cli {
    /// Path to the dashboard capture (PNG, JPEG, BMP, WebP).
    capture: PathBuf,

    /// Reporting period shown in the header and file name.
    #[arg(long, default_value = "Last 30 Days")]
    period: String,

    /// Theme the capture was taken in; picks the background fill.
    #[arg(long, value_enum, default_value_t = Mode::Light)]
    mode: Mode,

    /// Directory the report is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Report timestamp (RFC 3339).  Defaults to the current local time.
    ///
    /// The header shows the time in the given offset; the file name
    /// uses UTC.
    #[arg(long)]
    timestamp: Option<String>,

    /// Pause before capture, in milliseconds [default: 500].
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Number of capture attempts [default: 3].
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    attempts: Option<u32>,

    /// Print the outcome as JSON instead of a human-readable line.
    #[arg(long)]
    json: bool,

    /// Full export config as a JSON string.
    ///
    /// The JSON must be a valid `ExportConfig` serialization; missing
    /// fields take their defaults.  `--settle-ms` and `--attempts`
    /// override their fields on top of it.
    #[arg(long)]
    config_json: Option<String>,
}

/// Color mode selection.
#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Light theme, white background.
    Light,
    /// Dark theme, near-black background.
    Dark,
}

impl From<Mode> for ColorMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Light => Self::Light,
            Mode::Dark => Self::Dark,
        }
    }
}

/// Build an [`ExportConfig`] from CLI arguments.
///
/// Starts from `--config-json` when given, otherwise from the defaults,
/// then applies `--settle-ms` and `--attempts` if they were passed.
fn config_from_cli(cli: &Cli) -> Result<ExportConfig, String> {
    let mut config = match cli.config_json {
        Some(ref json) => serde_json::from_str(json)
            .map_err(|e| format!("Error parsing --config-json: {e}"))?,
        None => ExportConfig::default(),
    };
    if let Some(settle_ms) = cli.settle_ms {
        config.settle_delay = Duration::from_millis(settle_ms);
    }
    if let Some(attempts) = cli.attempts {
        config.capture_attempts = attempts;
    }
    Ok(config)
}

/// Parse `--timestamp`, or take the current local time.
fn timestamp_from_cli(cli: &Cli) -> Result<DateTime<FixedOffset>, String> {
    cli.timestamp.as_deref().map_or_else(
        || Ok(Local::now().fixed_offset()),
        |raw| {
            DateTime::parse_from_rfc3339(raw)
                .map_err(|e| format!("Error parsing --timestamp {raw:?}: {e}"))
        },
    )
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_pipeline=info,folio_pdf=info,folio_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let (config, timestamp) = match (config_from_cli(&cli), timestamp_from_cli(&cli)) {
        (Ok(config), Ok(timestamp)) => (config, timestamp),
        (Err(msg), _) | (_, Err(msg)) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let mut env = FileEnvironment::new(&cli.out_dir);
    let request = ExportRequest::new(Some(cli.capture.clone()), cli.mode.into(), &*cli.period)
        .at(timestamp);
    let guard = ExportGuard::new();
    let outcome = futures::executor::block_on(folio_pipeline::export(
        &mut env, &guard, request, &config,
    ));

    if cli.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing outcome: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        match &outcome {
            ExportOutcome::Saved { filename, pages } => {
                let path = env.sink().path_for(filename);
                println!("Saved {} ({pages} page(s))", path.display());
            }
            ExportOutcome::Failed { reason, .. } => {
                eprintln!("{}", reason.user_message());
            }
        }
    }

    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
