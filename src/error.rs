use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Invalid --month '{input}', expected YYYY-MM: {reason}")]
    InvalidMonth { input: String, reason: String },

    #[error("Invalid date '{input}', expected YYYY-MM-DD: {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("Invalid start time '{0}', expected \"YYYY-MM-DD HH:MM:SS\" or ISO 8601")]
    InvalidStartTime(String),

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: String, end: String },

    #[error("Mode selection error: {0}")]
    ModeSelection(String),

    #[error("Refusing to generate {count} lines (>{limit}). Re-run with --force if you really want this.")]
    TooManyRows { count: u64, limit: u64 },

    #[error("Time-synced probability must be within 0..=1, got {0}")]
    InvalidProbability(f64),

    #[error("Interval must be at least one second")]
    InvalidInterval,

    #[error("Timestamp for row {0} is out of range")]
    TimestampOverflow(u64),

    #[error("Distribution setup error: {0}")]
    Distribution(#[from] rand_distr::NormalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
