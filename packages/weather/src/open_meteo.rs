//! Open-Meteo forecast API client.
//!
//! Free, keyless, and global. Only the `current` block of the forecast
//! endpoint is used.
//!
//! See <https://open-meteo.com/en/docs>

use std::time::Duration;

use fire_watch_simulation_models::{Coordinates, WeatherReading};

use crate::{WeatherError, WeatherSource};

/// Public Open-Meteo forecast endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Variables requested in the `current` block.
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m";

/// Open-Meteo client.
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Creates a client for `base_url` whose requests give up after
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait::async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn current(&self, at: Coordinates) -> Result<WeatherReading, WeatherError> {
        let latitude = at.latitude.to_string();
        let longitude = at.longitude.to_string();

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("timezone", "auto"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        let reading = parse_response(&body)?;
        log::debug!(
            "Weather at ({}, {}): {:.1}C {:.0}% {:.1}km/h",
            at.latitude,
            at.longitude,
            reading.temperature,
            reading.humidity,
            reading.wind_speed
        );
        Ok(reading)
    }
}

/// Parses the `current` block of an Open-Meteo response.
fn parse_response(body: &serde_json::Value) -> Result<WeatherReading, WeatherError> {
    let current = body.get("current").ok_or_else(|| WeatherError::Parse {
        message: "Open-Meteo response has no current block".to_string(),
    })?;

    let field = |name: &str| {
        current[name]
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| WeatherError::Parse {
                message: format!("Missing {name} in Open-Meteo response"),
            })
    };

    Ok(WeatherReading {
        temperature: field("temperature_2m")?,
        humidity: field("relative_humidity_2m")?,
        wind_speed: field("wind_speed_10m")?,
    })
}
