mod config;
mod error;
mod generator;
mod resolver;
mod types;
mod writer;

use anyhow::{Context, Result};
use clap::Parser;
use generator::{Clock, RowGenerator};
use log::{info, LevelFilter};
use resolver::{GenerationMode, ModeArgs};
use simple_logger::SimpleLogger;
use types::{GenerationRequest, LogRow};

fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let cli = config::Cli::parse();
    let request = build_request(&cli)?;
    let written = run(&request, Clock::now())?;

    println!("Wrote {} lines to {}", written, request.outfile.display());
    Ok(())
}

fn run(request: &GenerationRequest, clock: Clock) -> Result<usize> {
    request.validate()?;

    let rows = generate(request, clock)?;
    let written = writer::write_log(&request.outfile, &rows, request.append)
        .with_context(|| format!("Failed to write {}", request.outfile.display()))?;

    info!("Wrote {} rows to {}", written, request.outfile.display());
    Ok(written)
}

fn build_request(cli: &config::Cli) -> Result<GenerationRequest> {
    let config = config::load_config(cli)?;
    info!("Configuration loaded: {:?}", config);

    let start_time = cli
        .start_time
        .as_deref()
        .map(resolver::parse_start_time)
        .transpose()?;

    let mode = GenerationMode::from_args(&ModeArgs {
        lines: cli.lines,
        month: cli.month.as_deref(),
        start_date: cli.start_date.as_deref(),
        end_date: cli.end_date.as_deref(),
    })?;
    let resolved = mode.resolve(config.interval_seconds, start_time)?;
    info!("Generating {} rows ({:?})", resolved.count, mode);

    Ok(GenerationRequest {
        count: resolved.count,
        start: resolved.start,
        interval_seconds: config.interval_seconds,
        seed: config.seed,
        time_synced_prob: config.time_synced_prob,
        outfile: config.outfile,
        append: cli.append,
        force: cli.force,
    })
}

fn generate(request: &GenerationRequest, clock: Clock) -> Result<Vec<LogRow>> {
    let generator = RowGenerator::new(
        request.count,
        request.start,
        request.interval_seconds,
        request.seed,
        request.time_synced_prob,
        clock,
    )?;

    generator
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to generate rows")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;
    use chrono::NaiveDate;
    use std::fs;
    use std::path::Path;

    fn clock() -> Clock {
        Clock {
            wall: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            epoch_ms: 1_735_689_600_000,
        }
    }

    fn cli(outfile: &Path, args: &[&str]) -> config::Cli {
        let mut argv = vec!["smartpot-loggen", "-o", outfile.to_str().unwrap()];
        argv.extend_from_slice(args);
        config::Cli::try_parse_from(argv).unwrap()
    }

    fn run_cli(outfile: &Path, args: &[&str]) -> Result<usize> {
        let request = build_request(&cli(outfile, args))?;
        run(&request, clock())
    }

    fn data_lines(path: &Path) -> usize {
        fs::read_to_string(path).unwrap().lines().count() - 1
    }

    #[test]
    fn test_fixed_seed_gives_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let args = ["--seed", "1234", "--month", "2025-02", "-i", "3600", "--time-synced-prob", "0.7"];

        run_cli(&a, &args).unwrap();
        run_cli(&b, &args).unwrap();

        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    #[test]
    fn test_month_mode_row_count() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("feb.txt");

        let written = run_cli(&out, &["--month", "2025-02", "-i", "86400", "--seed", "1"]).unwrap();
        assert_eq!(written, 28);
        assert_eq!(data_lines(&out), 28);
    }

    #[test]
    fn test_range_mode_anchors_synced_rows() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("day.txt");
        let args = ["--start-date", "2025-01-01", "-i", "3600", "--seed", "1", "--time-synced-prob", "1"];

        assert_eq!(run_cli(&out, &args).unwrap(), 24);
        let content = fs::read_to_string(&out).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert!(lines[1].starts_with("2025-01-01 00:00:00,"));
        assert!(lines[24].starts_with("2025-01-01 23:00:00,"));
    }

    #[test]
    fn test_lines_mode_ignores_interval() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("ten.txt");

        let written = run_cli(&out, &["--lines", "10", "-i", "86400"]).unwrap();
        assert_eq!(written, 10);
        assert_eq!(data_lines(&out), 10);
    }

    #[test]
    fn test_safety_guard_and_force() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("big.txt");

        let err = run_cli(&out, &["-n", "20001", "--seed", "1"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenError>(),
            Some(GenError::TooManyRows { count: 20_001, .. })
        ));
        assert!(!out.exists());

        let written = run_cli(&out, &["-n", "20001", "--seed", "1", "--force"]).unwrap();
        assert_eq!(written, 20_001);
        assert_eq!(data_lines(&out), 20_001);
    }

    #[test]
    fn test_append_keeps_previous_rows() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("log/log.txt");

        run_cli(&out, &["-n", "3", "--seed", "1"]).unwrap();
        let first = fs::read_to_string(&out).unwrap();

        run_cli(&out, &["-n", "2", "--seed", "2", "--append"]).unwrap();
        let combined = fs::read_to_string(&out).unwrap();

        assert!(combined.starts_with(&first));
        assert_eq!(combined.lines().count(), 1 + 3 + 2);
    }

    #[test]
    fn test_missing_mode_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("none.txt");

        let err = run_cli(&out, &["--seed", "1"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenError>(),
            Some(GenError::ModeSelection(_))
        ));
    }

    #[test]
    fn test_bad_inputs_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bad.txt");

        let err = run_cli(&out, &["--month", "2025-13"]).unwrap_err();
        assert!(err.to_string().contains("2025-13"));

        let err = run_cli(&out, &["-n", "1", "-s", "tomorrow"]).unwrap_err();
        assert!(err.to_string().contains("tomorrow"));

        let err = run_cli(&out, &["-n", "1", "--time-synced-prob", "2"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenError>(),
            Some(GenError::InvalidProbability(_))
        ));
    }
}
