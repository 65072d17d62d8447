#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Live weather lookups for the wildfire simulation.
//!
//! The simulation only needs the current temperature, relative humidity,
//! and wind speed at a district's coordinates. Lookups are best-effort:
//! callers are expected to treat any [`WeatherError`] as "no data" and
//! carry on.
//!
//! The only provider today is [`open_meteo`], which needs no API key.

pub mod open_meteo;

use fire_watch_simulation_models::{Coordinates, WeatherReading};
use thiserror::Error;

/// Errors from weather lookups.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Weather provider returned HTTP {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// A source of current weather conditions.
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetches current conditions at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError`] if the provider is unreachable or its
    /// response cannot be understood.
    async fn current(&self, at: Coordinates) -> Result<WeatherReading, WeatherError>;
}
