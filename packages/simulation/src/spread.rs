//! Weather-driven spread rate.
//!
//! A simplified fire weather index: hot, dry, windy conditions make the
//! fire grow faster. Each factor is 1.0 at the reference conditions
//! (30 °C, 30 % humidity, calm air):
//!
//! ```text
//! temp_factor     = max(0.1, temperature / 30)
//! humidity_factor = max(0.1, (100 - humidity) / 70)
//! wind_factor     = 1 + wind_speed / 10
//! multiplier      = temp_factor * humidity_factor * wind_factor
//! ```
//!
//! The floors keep sub-freezing or saturated readings from stalling the
//! fire entirely. Wind is unbounded.

use fire_watch_simulation_models::WeatherReading;

/// Multiplier used when no weather reading is available.
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// Lower bound of the temperature and humidity factors.
const FACTOR_FLOOR: f64 = 0.1;

/// Temperature (°C) at which the temperature factor is 1.0.
const REFERENCE_TEMPERATURE: f64 = 30.0;

/// Dryness (100 - humidity) at which the humidity factor is 1.0.
const REFERENCE_DRYNESS: f64 = 70.0;

/// Wind speed (km/h) that adds 1.0 to the wind factor.
const WIND_STEP: f64 = 10.0;

/// The three components of the spread multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadFactors {
    /// Temperature contribution.
    pub temperature: f64,
    /// Humidity contribution.
    pub humidity: f64,
    /// Wind contribution.
    pub wind: f64,
}

impl SpreadFactors {
    /// Computes the factors for a reading.
    #[must_use]
    pub fn from_reading(reading: &WeatherReading) -> Self {
        Self {
            temperature: FACTOR_FLOOR.max(reading.temperature / REFERENCE_TEMPERATURE),
            humidity: FACTOR_FLOOR.max((100.0 - reading.humidity) / REFERENCE_DRYNESS),
            wind: 1.0 + reading.wind_speed / WIND_STEP,
        }
    }

    /// Product of the three factors.
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        self.temperature * self.humidity * self.wind
    }
}

/// Spread-rate multiplier for a tick; [`DEFAULT_MULTIPLIER`] without data.
#[must_use]
pub fn spread_multiplier(reading: Option<&WeatherReading>) -> f64 {
    reading.map_or(DEFAULT_MULTIPLIER, |r| {
        SpreadFactors::from_reading(r).multiplier()
    })
}
