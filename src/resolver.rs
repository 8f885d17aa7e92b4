//! Works out how many rows to generate and where synced timestamps start.
//!
//! Exactly one mode is selected per invocation: an explicit line count,
//! a calendar month, or a date range.

use crate::error::GenError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMode {
    Lines {
        count: u64,
        start_date: Option<NaiveDate>,
    },
    Month {
        year: i32,
        month: u32,
    },
    Range {
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
}

/// Raw mode flags as they arrive from the command line.
#[derive(Debug, Default, Clone)]
pub struct ModeArgs<'a> {
    pub lines: Option<u64>,
    pub month: Option<&'a str>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub count: u64,
    pub start: Option<NaiveDateTime>,
}

impl GenerationMode {
    pub fn from_args(args: &ModeArgs<'_>) -> Result<Self, GenError> {
        match (args.lines, args.month, args.start_date, args.end_date) {
            (Some(_), Some(_), _, _) => Err(GenError::ModeSelection(
                "--lines and --month cannot be combined".into(),
            )),
            (Some(_), None, _, Some(_)) => Err(GenError::ModeSelection(
                "--end-date only applies to date range mode, not --lines".into(),
            )),
            (Some(count), None, start_date, None) => Ok(GenerationMode::Lines {
                count,
                start_date: start_date.map(parse_date).transpose()?,
            }),
            (None, Some(_), Some(_), _) | (None, Some(_), _, Some(_)) => {
                Err(GenError::ModeSelection(
                    "--month cannot be combined with --start-date or --end-date".into(),
                ))
            }
            (None, Some(month), None, None) => {
                let (year, month) = parse_month(month)?;
                Ok(GenerationMode::Month { year, month })
            }
            (None, None, Some(start), end) => Ok(GenerationMode::Range {
                start: parse_date(start)?,
                end: end.map(parse_date).transpose()?,
            }),
            (None, None, None, Some(_)) => Err(GenError::ModeSelection(
                "--end-date requires --start-date".into(),
            )),
            (None, None, None, None) => Err(GenError::ModeSelection(
                "Specify --lines or --month or --start-date".into(),
            )),
        }
    }

    /// Resolve the row count and synced-timestamp anchor. `start_time` is the
    /// explicit `--start-time`, used only when the mode does not anchor itself.
    pub fn resolve(
        &self,
        interval_seconds: u64,
        start_time: Option<NaiveDateTime>,
    ) -> Result<Resolved, GenError> {
        if interval_seconds == 0 {
            return Err(GenError::InvalidInterval);
        }

        let resolved = match *self {
            GenerationMode::Lines { count, start_date } => Resolved {
                count,
                start: start_date.map(midnight).or(start_time),
            },
            GenerationMode::Month { year, month } => {
                let start = month_start(year, month)?;
                let (next_year, next_month) = if month == 12 {
                    (year + 1, 1)
                } else {
                    (year, month + 1)
                };
                let interval = seconds(interval_seconds)?;
                let end = month_start(next_year, next_month)?
                    .checked_sub_signed(interval)
                    .ok_or(GenError::TimestampOverflow(0))?;
                Resolved {
                    count: span_count(start, end, interval_seconds),
                    start: Some(start),
                }
            }
            GenerationMode::Range { start, end } => {
                let end_date = end.unwrap_or(start);
                if end_date < start {
                    return Err(GenError::EndBeforeStart {
                        start: start.to_string(),
                        end: end_date.to_string(),
                    });
                }
                let start = midnight(start);
                let end = end_of_day(end_date);
                Resolved {
                    count: span_count(start, end, interval_seconds),
                    start: Some(start),
                }
            }
        };

        debug!("Resolved {:?} to {:?}", self, resolved);
        Ok(resolved)
    }
}

/// `floor((end - start) / interval) + 1`, or zero when the span is negative.
fn span_count(start: NaiveDateTime, end: NaiveDateTime, interval_seconds: u64) -> u64 {
    let total = (end - start).num_seconds();
    if total < 0 {
        return 0;
    }
    total as u64 / interval_seconds + 1
}

fn seconds(secs: u64) -> Result<TimeDelta, GenError> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or(GenError::TimestampOverflow(0))
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    // 23:59:59 is always a valid time
    date.and_hms_opt(23, 59, 59).unwrap_or_else(|| midnight(date))
}

fn month_start(year: i32, month: u32) -> Result<NaiveDateTime, GenError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(midnight)
        .ok_or_else(|| GenError::InvalidMonth {
            input: format!("{}-{:02}", year, month),
            reason: "date out of range".into(),
        })
}

pub fn parse_month(input: &str) -> Result<(i32, u32), GenError> {
    let invalid = |reason: &str| GenError::InvalidMonth {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let (year, month) = input
        .trim()
        .split_once('-')
        .ok_or_else(|| invalid("missing '-' separator"))?;
    let year: i32 = year
        .parse()
        .map_err(|e| invalid(&format!("bad year: {}", e)))?;
    let month: u32 = month
        .parse()
        .map_err(|e| invalid(&format!("bad month: {}", e)))?;
    if !(1..=12).contains(&month) {
        return Err(invalid("month must be between 1 and 12"));
    }
    // Reject years chrono cannot represent
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| invalid("year out of range"))?;

    Ok((year, month))
}

pub fn parse_date(input: &str) -> Result<NaiveDate, GenError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|e| GenError::InvalidDate {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Accepts `YYYY-MM-DD HH:MM:SS` plus the common ISO 8601 shapes. Offsets
/// are dropped, keeping the wall-clock time they were written in.
pub fn parse_start_time(input: &str) -> Result<NaiveDateTime, GenError> {
    const FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let s = input.trim();
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(midnight(date));
    }

    Err(GenError::InvalidStartTime(input.to_string()))
}
