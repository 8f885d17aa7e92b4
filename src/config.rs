use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_OUTFILE: &str = "log/log.txt";
pub const DEFAULT_TIME_SYNCED_PROB: f64 = 0.95;

/// Generate fake smart-pot CSV logs.
///
/// Pick exactly one of --lines, --month or --start-date [--end-date].
#[derive(Parser, Debug)]
#[clap(name = "smartpot-loggen", version, about)]
pub struct Cli {
    /// Number of log lines to generate
    #[clap(long, short = 'n', conflicts_with = "month")]
    pub lines: Option<u64>,

    /// Generate logs for a calendar month, format YYYY-MM
    #[clap(long)]
    pub month: Option<String>,

    /// Start date YYYY-MM-DD (inclusive) for range generation; also anchors --lines
    #[clap(long)]
    pub start_date: Option<String>,

    /// End date YYYY-MM-DD (inclusive) for range generation [default: start date]
    #[clap(long)]
    pub end_date: Option<String>,

    /// Interval between log lines in seconds [default: 60]
    #[clap(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_seconds: Option<u64>,

    /// Output file path, parent directories are created [default: log/log.txt]
    #[clap(long, short = 'o')]
    pub outfile: Option<PathBuf>,

    /// Random seed for reproducible output
    #[clap(long)]
    pub seed: Option<u64>,

    /// Timestamp of the first synced line ("YYYY-MM-DD HH:MM:SS" or ISO 8601)
    #[clap(long, short = 's')]
    pub start_time: Option<String>,

    /// Probability a line has a synced human timestamp (0..1) [default: 0.95]
    #[clap(long)]
    pub time_synced_prob: Option<f64>,

    /// Append to outfile instead of overwriting
    #[clap(long)]
    pub append: bool,

    /// Allow generating very large files
    #[clap(long)]
    pub force: bool,

    /// Optional TOML file with default settings
    #[clap(long)]
    pub config: Option<PathBuf>,
}

/// Defaults read from the `--config` file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub interval_seconds: Option<u64>,
    pub outfile: Option<PathBuf>,
    pub seed: Option<u64>,
    pub time_synced_prob: Option<f64>,
}

/// Settings after merging command line, config file and built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub interval_seconds: u64,
    pub outfile: PathBuf,
    pub seed: Option<u64>,
    pub time_synced_prob: f64,
}

pub fn load_config(cli: &Cli) -> Result<Config> {
    let file = match cli.config {
        Some(ref path) => read_file_config(path)?,
        None => FileConfig::default(),
    };

    Ok(merge(cli, file))
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

fn merge(cli: &Cli, file: FileConfig) -> Config {
    Config {
        interval_seconds: cli
            .interval_seconds
            .or(file.interval_seconds)
            .unwrap_or(DEFAULT_INTERVAL_SECONDS),
        outfile: cli
            .outfile
            .clone()
            .or(file.outfile)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTFILE)),
        seed: cli.seed.or(file.seed),
        time_synced_prob: cli
            .time_synced_prob
            .or(file.time_synced_prob)
            .unwrap_or(DEFAULT_TIME_SYNCED_PROB),
    }
}
