//! Seeded row generator producing plausible smart-pot sensor readings.

use crate::error::GenError;
use crate::types::{LogRow, RowTimestamp};
use chrono::{DateTime, Local, NaiveDateTime, TimeDelta};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

const PUMP_BASE_CHANCE: f64 = 0.01;
const PUMP_DRY_BOOST: f64 = 0.08;
const DRY_SOIL_PERCENT: f64 = 25.0;

/// Mean, standard deviation and physical bounds of one sensor channel.
#[derive(Debug, Clone, Copy)]
struct Channel {
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
}

const SOIL: Channel = Channel { mean: 40.0, std_dev: 12.0, min: 0.0, max: 100.0 };
const WATER: Channel = Channel { mean: 30.0, std_dev: 18.0, min: 0.0, max: 100.0 };
const TEMP: Channel = Channel { mean: 22.0, std_dev: 3.0, min: -40.0, max: 125.0 };
const HUM: Channel = Channel { mean: 55.0, std_dev: 12.0, min: 0.0, max: 100.0 };

struct Sampler {
    normal: Normal<f64>,
    min: f64,
    max: f64,
}

impl Sampler {
    fn new(channel: Channel) -> Result<Self, GenError> {
        Ok(Self {
            normal: Normal::new(channel.mean, channel.std_dev)?,
            min: channel.min,
            max: channel.max,
        })
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.normal.sample(rng).clamp(self.min, self.max)
    }
}

/// The moment a generator was started. Synced rows without an explicit
/// start count from `wall`, unsynced rows count from `epoch_ms`.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    pub wall: NaiveDateTime,
    pub epoch_ms: i64,
}

impl Clock {
    pub fn now() -> Self {
        Self::from(Local::now())
    }
}

impl From<DateTime<Local>> for Clock {
    fn from(now: DateTime<Local>) -> Self {
        Self {
            wall: now.naive_local(),
            epoch_ms: now.timestamp_millis(),
        }
    }
}

/// Iterator over `count` rows. Two generators built from the same seed,
/// start and clock yield identical rows.
pub struct RowGenerator {
    rng: StdRng,
    index: u64,
    count: u64,
    start: NaiveDateTime,
    epoch_ms: i64,
    interval_seconds: u64,
    time_synced_prob: f64,
    soil: Sampler,
    water: Sampler,
    temp: Sampler,
    hum: Sampler,
}

impl RowGenerator {
    pub fn new(
        count: u64,
        start: Option<NaiveDateTime>,
        interval_seconds: u64,
        seed: Option<u64>,
        time_synced_prob: f64,
        clock: Clock,
    ) -> Result<Self, GenError> {
        if !(0.0..=1.0).contains(&time_synced_prob) {
            return Err(GenError::InvalidProbability(time_synced_prob));
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            rng,
            index: 0,
            count,
            start: start.unwrap_or(clock.wall),
            epoch_ms: clock.epoch_ms,
            interval_seconds,
            time_synced_prob,
            soil: Sampler::new(SOIL)?,
            water: Sampler::new(WATER)?,
            temp: Sampler::new(TEMP)?,
            hum: Sampler::new(HUM)?,
        })
    }

    fn timestamp(&self, synced: bool) -> Result<RowTimestamp, GenError> {
        let i = self.index;
        let offset_secs = i
            .checked_mul(self.interval_seconds)
            .and_then(|s| i64::try_from(s).ok())
            .ok_or(GenError::TimestampOverflow(i))?;

        if synced {
            TimeDelta::try_seconds(offset_secs)
                .and_then(|delta| self.start.checked_add_signed(delta))
                .map(RowTimestamp::Synced)
                .ok_or(GenError::TimestampOverflow(i))
        } else {
            offset_secs
                .checked_mul(1000)
                .and_then(|ms| self.epoch_ms.checked_add(ms))
                .map(RowTimestamp::Unsynced)
                .ok_or(GenError::TimestampOverflow(i))
        }
    }

    fn next_row(&mut self) -> Result<LogRow, GenError> {
        let synced = self.rng.random::<f64>() < self.time_synced_prob;
        let timestamp = self.timestamp(synced)?;

        let soil_percent = self.soil.sample(&mut self.rng);
        let water_percent = self.water.sample(&mut self.rng);
        let temp = self.temp.sample(&mut self.rng);
        let hum = self.hum.sample(&mut self.rng);

        let mut pump_chance = PUMP_BASE_CHANCE;
        if soil_percent < DRY_SOIL_PERCENT {
            pump_chance += PUMP_DRY_BOOST;
        }
        let pump_on = self.rng.random::<f64>() < pump_chance;

        Ok(LogRow {
            timestamp,
            soil_percent,
            water_percent,
            temp,
            hum,
            pump_on,
        })
    }
}

impl Iterator for RowGenerator {
    type Item = Result<LogRow, GenError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let row = self.next_row();
        self.index += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.count - self.index).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}
