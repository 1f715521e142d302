//! onboard - people-on-board report from the command line.
//!
//! Downloads the intake, medevac and disembarkation forms of the current
//! rotation, reconciles them and prints the report as JSON on stdout.
//! Logs go to stderr (`RUST_LOG`), and also to a daily log file when
//! `ONBOARD_LOG_DIR` is set.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use onboard_core::api::load_rotations;
use onboard_core::utils::parse_day_first_date;
use onboard_core::{build_report, export_roster, Config, SourceData, SurveyClient};

/// Log file name prefix inside `ONBOARD_LOG_DIR`
const LOG_FILE_PREFIX: &str = "onboard.log";

const USAGE: &str = "\
Usage: onboard [OPTIONS]

Options:
  --rescue <N|total>   Rescue to report on (default: latest rescue)
  --date <dd-mm-yyyy>  Report as of this day (default: today, UTC)
  --source <file>      Read already-fetched source data from a JSON file
  --export             Print the reconciled roster as a table
  --tables             Print the summary tables instead of the full report
  -h, --help           Show this help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Report,
    Export,
    Tables,
}

#[derive(Debug)]
struct CliArgs {
    rescue: Option<String>,
    date: Option<NaiveDate>,
    source: Option<PathBuf>,
    output: Output,
}

fn parse_args(args: &[String]) -> Result<Option<CliArgs>> {
    let mut parsed = CliArgs {
        rescue: None,
        date: None,
        source: None,
        output: Output::Report,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--rescue" => {
                let value = iter.next().context("--rescue needs a value")?;
                parsed.rescue = Some(value.clone());
            }
            "--date" => {
                let value = iter.next().context("--date needs a value")?;
                let date = parse_day_first_date(value)
                    .with_context(|| format!("Unreadable date '{}', expected dd-mm-yyyy", value))?;
                parsed.date = Some(date);
            }
            "--source" => {
                let value = iter.next().context("--source needs a file path")?;
                parsed.source = Some(PathBuf::from(value));
            }
            "--export" => parsed.output = Output::Export,
            "--tables" => parsed.output = Output::Tables,
            other => bail!("Unknown argument '{}'\n\n{}", other, USAGE),
        }
    }

    Ok(Some(parsed))
}

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the log file and must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var("ONBOARD_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

async fn load_source(args: &CliArgs) -> Result<SourceData> {
    if let Some(path) = &args.source {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse source data in {}", path.display()));
    }

    let config = Config::load()?;
    let rotations = load_rotations(config.require_rotations_path()?)?;
    let client = SurveyClient::from_config(&config)?;
    client.fetch_source_data(&config, rotations).await
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(args) = parse_args(&args)? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let _log_guard = init_tracing();
    info!("onboard starting");

    let as_of = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let source = load_source(&args).await?;
    let rescue = args.rescue.as_deref();

    let output = match args.output {
        Output::Report => serde_json::to_string_pretty(&build_report(&source, rescue, as_of))?,
        Output::Export => serde_json::to_string_pretty(&export_roster(&source, rescue, as_of))?,
        Output::Tables => {
            let report = build_report(&source, rescue, as_of);
            serde_json::to_string_pretty(&serde_json::json!({
                "date": &report.date,
                "rotation_no": report.rotation_no,
                "people_onboard": report.people_onboard_table(),
                "vulnerability": report.vulnerability_table(),
                "disability": report.disability_table(),
                "rescues": report.rescue_summaries(),
            }))?
        }
    };
    println!("{}", output);

    info!("onboard finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(&args(&["--rescue", "total", "--date", "15-04-2024", "--tables"]))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.rescue.as_deref(), Some("total"));
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2024, 4, 15));
        assert_eq!(parsed.output, Output::Tables);
    }

    #[test]
    fn test_parse_args_defaults_and_errors() {
        let parsed = parse_args(&[]).unwrap().unwrap();
        assert_eq!(parsed.output, Output::Report);
        assert!(parsed.rescue.is_none());

        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
        assert!(parse_args(&args(&["--date", "yesterday"])).is_err());
        assert!(parse_args(&args(&["--rescue"])).is_err());
        assert!(parse_args(&args(&["--verbose"])).is_err());
    }
}
