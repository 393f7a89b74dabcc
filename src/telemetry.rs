//! Synthetic drone telemetry for demos
//!
//! Temperatures come from N(25, 2), humidity from U(40, 60). Samples are one
//! minute apart and the last one lands on `end`.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::DashboardError;
use crate::models::SampleTelemetryPoint;

pub const DEFAULT_SAMPLES: usize = 50;
/// Upper bound on samples per call, shared by config, CLI and API
pub const MAX_SAMPLES: usize = 10_000;

const TEMPERATURE_MEAN: f64 = 25.0;
const TEMPERATURE_STD_DEV: f64 = 2.0;
const HUMIDITY_MIN: f64 = 40.0;
const HUMIDITY_MAX: f64 = 60.0;

/// Generate `samples` points ending at `end` using the thread-local RNG
pub fn generate(
    samples: usize,
    end: DateTime<Utc>,
) -> Result<Vec<SampleTelemetryPoint>, DashboardError> {
    generate_with_rng(&mut rand::rng(), samples, end)
}

/// Generate `samples` points ending at `end` from a caller-supplied RNG.
///
/// `samples` must be in `1..=MAX_SAMPLES`.
pub fn generate_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    samples: usize,
    end: DateTime<Utc>,
) -> Result<Vec<SampleTelemetryPoint>, DashboardError> {
    if !(1..=MAX_SAMPLES).contains(&samples) {
        return Err(DashboardError::validation(format!(
            "Sample count must be between 1 and {MAX_SAMPLES}, got: {samples}"
        )));
    }

    let temperature = Normal::new(TEMPERATURE_MEAN, TEMPERATURE_STD_DEV)
        .map_err(|e| DashboardError::telemetry(e.to_string()))?;
    let humidity = Uniform::new(HUMIDITY_MIN, HUMIDITY_MAX)
        .map_err(|e| DashboardError::telemetry(e.to_string()))?;

    let points = (0..samples)
        .rev()
        .map(|minutes_before_end| SampleTelemetryPoint {
            timestamp: end - Duration::minutes(minutes_before_end as i64),
            temperature: temperature.sample(rng),
            humidity: humidity.sample(rng),
        })
        .collect();

    Ok(points)
}
