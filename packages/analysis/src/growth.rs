//! Placeholder urban growth estimator.
//!
//! **Non-authoritative.** Every indicator is an independent uniform draw
//! from a fixed plausible range, rounded to two decimal places. Nothing
//! here is derived from imagery, census data, or the location itself; the
//! values change on every call.

use std::ops::RangeInclusive;

use rand::Rng;
use urban_growth_models::GrowthMetrics;

/// Range of [`GrowthMetrics::population_density`].
pub const POPULATION_DENSITY_RANGE: RangeInclusive<f64> = 500.0..=5000.0;
/// Range of [`GrowthMetrics::built_up_percentage`].
pub const BUILT_UP_PERCENTAGE_RANGE: RangeInclusive<f64> = 30.0..=70.0;
/// Range of [`GrowthMetrics::expansion_rate`].
pub const EXPANSION_RATE_RANGE: RangeInclusive<f64> = 1.5..=5.0;

/// Draws a fresh set of placeholder metrics from the thread-local RNG.
#[must_use]
pub fn estimate() -> GrowthMetrics {
    estimate_with(&mut rand::thread_rng())
}

/// Draws a fresh set of placeholder metrics from `rng`.
pub fn estimate_with<R: Rng + ?Sized>(rng: &mut R) -> GrowthMetrics {
    GrowthMetrics {
        population_density: draw(rng, POPULATION_DENSITY_RANGE),
        built_up_percentage: draw(rng, BUILT_UP_PERCENTAGE_RANGE),
        expansion_rate: draw(rng, EXPANSION_RATE_RANGE),
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<f64>) -> f64 {
    (rng.gen_range(range) * 100.0).round() / 100.0
}
