//! Simulated weather sensor.
//!
//! There is no hardware behind Ignira. Readings are drawn uniformly from
//! bounded ranges using an injected random source, so tests and reproducible
//! deployments can seed it.

use std::ops::Range;

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::model::WeatherSample;

/// Temperature range in °C.
pub const TEMPERATURE_RANGE: Range<f64> = 0.0..40.0;

/// Relative humidity range in percent.
pub const HUMIDITY_RANGE: Range<f64> = 0.0..100.0;

/// Wind speed range in km/h.
pub const WIND_SPEED_RANGE: Range<f64> = 0.0..20.0;

/// Most readings a single bulk collection may request.
pub const MAX_SENSOR_QUANTITY: u32 = 1_000;

/// Generates bounded random [`WeatherSample`]s on demand.
#[derive(Debug, Clone)]
pub struct SensorSimulator<R = StdRng> {
    rng: R,
}

impl SensorSimulator<StdRng> {
    /// Create a simulator seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Create a simulator that yields the same readings for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for SensorSimulator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SensorSimulator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Collect a reading stamped with today's date (UTC).
    ///
    /// The simulator does not check `sample_id` for uniqueness; that is the
    /// caller's job.
    pub fn collect(&mut self, sample_id: u32) -> WeatherSample {
        self.collect_on(sample_id, Utc::now().date_naive())
    }

    /// Collect a reading stamped with `date`.
    pub fn collect_on(&mut self, sample_id: u32, date: NaiveDate) -> WeatherSample {
        let temperature = self.rng.random_range(TEMPERATURE_RANGE);
        let humidity = self.rng.random_range(HUMIDITY_RANGE);
        let wind_speed = self.rng.random_range(WIND_SPEED_RANGE);

        debug!(
            sample_id,
            temperature,
            humidity,
            wind_speed,
            "Simulated weather reading"
        );

        WeatherSample::from_valid_parts(sample_id, temperature, humidity, wind_speed, date)
    }
}
