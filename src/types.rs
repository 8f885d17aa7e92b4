use crate::error::GenError;
use chrono::NaiveDateTime;
use std::fmt;
use std::path::PathBuf;

/// Column names of the device log, in field order.
pub const HEADER: [&str; 7] = [
    "timestamp",
    "soilPercent",
    "waterPercent",
    "temp",
    "hum",
    "pumpOn",
    "timeSynced",
];

/// Largest row count accepted without `--force`.
pub const MAX_LINES_WITHOUT_FORCE: u64 = 20_000;

pub const HUMAN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp of a single row. A synced row carries wall-clock time,
/// an unsynced row carries the device millisecond counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTimestamp {
    Synced(NaiveDateTime),
    Unsynced(i64),
}

impl RowTimestamp {
    pub fn is_synced(&self) -> bool {
        matches!(self, RowTimestamp::Synced(_))
    }
}

impl fmt::Display for RowTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowTimestamp::Synced(dt) => write!(f, "{}", dt.format(HUMAN_TIMESTAMP_FORMAT)),
            RowTimestamp::Unsynced(ms) => write!(f, "ms:{}", ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub timestamp: RowTimestamp,
    pub soil_percent: f64,
    pub water_percent: f64,
    pub temp: f64,
    pub hum: f64,
    pub pump_on: bool,
}

impl LogRow {
    pub fn time_synced(&self) -> bool {
        self.timestamp.is_synced()
    }

    /// Render the row as CSV fields in header order.
    pub fn to_record(&self) -> [String; 7] {
        [
            self.timestamp.to_string(),
            format!("{:.1}", self.soil_percent),
            format!("{:.1}", self.water_percent),
            format!("{:.1}", self.temp),
            format!("{:.1}", self.hum),
            flag(self.pump_on).to_string(),
            flag(self.time_synced()).to_string(),
        ]
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Everything one invocation needs to produce and write a log file.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub count: u64,
    pub start: Option<NaiveDateTime>,
    pub interval_seconds: u64,
    pub seed: Option<u64>,
    pub time_synced_prob: f64,
    pub outfile: PathBuf,
    pub append: bool,
    pub force: bool,
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<(), GenError> {
        if !(0.0..=1.0).contains(&self.time_synced_prob) {
            return Err(GenError::InvalidProbability(self.time_synced_prob));
        }
        if self.interval_seconds == 0 {
            return Err(GenError::InvalidInterval);
        }
        check_row_limit(self.count, self.force)
    }
}

/// Safety guard against accidentally huge files.
pub fn check_row_limit(count: u64, force: bool) -> Result<(), GenError> {
    if count > MAX_LINES_WITHOUT_FORCE && !force {
        return Err(GenError::TooManyRows {
            count,
            limit: MAX_LINES_WITHOUT_FORCE,
        });
    }
    Ok(())
}
