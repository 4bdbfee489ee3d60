use std::time::Duration;

use rand::Rng;

use crate::error::Error;

pub const DEFAULT_COUNT: u32 = 10;
pub const DEFAULT_DELAY_MIN_SECS: f64 = 1.0;
pub const DEFAULT_DELAY_MAX_SECS: f64 = 3.0;

/// Inclusive bounds for the pause between two submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Result<Self, Error> {
        if min > max {
            return Err(Error::Config(format!(
                "delay-min ({}s) must not exceed delay-max ({}s)",
                min.as_secs_f64(),
                max.as_secs_f64()
            )));
        }
        Ok(Self { min, max })
    }

    pub fn from_secs(min: f64, max: f64) -> Result<Self, Error> {
        Self::new(to_duration("delay-min", min)?, to_duration("delay-max", max)?)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Uniform pick in `[min, max]` at nanosecond resolution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let lo = nanos(self.min);
        let hi = nanos(self.max);
        if lo == hi {
            return self.min;
        }
        Duration::from_nanos(rng.random_range(lo..=hi))
    }
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

fn to_duration(name: &str, secs: f64) -> Result<Duration, Error> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::Config(format!(
            "{name} must be a non-negative number of seconds, got {secs}"
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| Error::Config(format!("Invalid {name}: {e}")))
}

/// How many submissions to make and how far apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub count: u32,
    pub delays: DelayRange,
}

impl RunSettings {
    pub fn new(count: u32, delay_min: f64, delay_max: f64) -> Result<Self, Error> {
        if count == 0 {
            return Err(Error::Config("count must be at least 1".to_string()));
        }
        Ok(Self {
            count,
            delays: DelayRange::from_secs(delay_min, delay_max)?,
        })
    }

    pub fn with_max_count(self, max_count: u32) -> Result<Self, Error> {
        if self.count > max_count {
            return Err(Error::Config(format!(
                "count ({}) exceeds the maximum of {max_count}",
                self.count
            )));
        }
        Ok(self)
    }
}
