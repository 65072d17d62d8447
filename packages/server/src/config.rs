//! Server configuration from environment variables.
//!
//! Every variable is optional. Empty values count as unset. Anything that
//! is set but cannot be parsed is an error, and the server refuses to
//! start.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use fire_watch_district::UnknownDistrictPolicy;
use fire_watch_simulation::SimulationConfig;
use fire_watch_weather::open_meteo;
use thiserror::Error;

/// A configuration value that could not be used.
#[derive(Debug, Error)]
#[error("Invalid {key}={value:?}: {message}")]
pub struct ConfigError {
    /// Environment variable name.
    pub key: &'static str,
    /// The value as found.
    pub value: String,
    /// Why it was refused.
    pub message: String,
}

/// Everything the server reads at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `BIND_ADDR`
    pub bind_addr: String,
    /// `PORT`
    pub port: u16,
    /// `TICK_INTERVAL_MS`, `BASE_SPREAD_RATE`, `SEED_RADIUS`,
    /// `WEATHER_TIMEOUT_SECS`, `UNKNOWN_DISTRICT_POLICY`
    pub simulation: SimulationConfig,
    /// `WEATHER_BASE_URL`
    pub weather_base_url: String,
    /// `DISTRICTS_FILE`
    pub districts_file: Option<PathBuf>,
    /// `DEFAULT_DISTRICT`
    pub default_district: Option<String>,
    /// `NOTIFY_WEBHOOK_URL`
    pub notify_webhook_url: Option<String>,
    /// `NOTIFY_RECIPIENTS` (comma-separated)
    pub notify_recipients: Vec<String>,
    /// `PREDICT_MODEL_PATH`
    pub predict_model_path: Option<PathBuf>,
    /// `STATIC_DIR`
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first variable that is set to an
    /// unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable
    /// name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first variable that is set to an
    /// unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let defaults = SimulationConfig::default();

        let default_tick_ms =
            u64::try_from(defaults.tick_interval.as_millis()).unwrap_or(u64::MAX);
        let tick_ms: u64 = parse(&get, "TICK_INTERVAL_MS", default_tick_ms)?;
        if tick_ms == 0 {
            return Err(invalid("TICK_INTERVAL_MS", "0", "must be positive"));
        }

        let weather_timeout_secs: u64 = parse(
            &get,
            "WEATHER_TIMEOUT_SECS",
            defaults.weather_timeout.as_secs(),
        )?;
        if weather_timeout_secs == 0 {
            return Err(invalid("WEATHER_TIMEOUT_SECS", "0", "must be positive"));
        }

        let base_spread_rate = non_negative(
            "BASE_SPREAD_RATE",
            parse(&get, "BASE_SPREAD_RATE", defaults.base_spread_rate)?,
        )?;
        let seed_radius = non_negative(
            "SEED_RADIUS",
            parse(&get, "SEED_RADIUS", defaults.seed_radius)?,
        )?;
        let unknown_district_policy: UnknownDistrictPolicy = parse(
            &get,
            "UNKNOWN_DISTRICT_POLICY",
            UnknownDistrictPolicy::FallbackToDefault,
        )?;

        let simulation = SimulationConfig {
            tick_interval: Duration::from_millis(tick_ms),
            base_spread_rate,
            seed_radius,
            weather_timeout: Duration::from_secs(weather_timeout_secs),
            unknown_district_policy,
            ..defaults
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse(&get, "PORT", 8000)?,
            simulation,
            weather_base_url: get("WEATHER_BASE_URL")
                .unwrap_or_else(|| open_meteo::DEFAULT_BASE_URL.to_string()),
            districts_file: get("DISTRICTS_FILE").map(PathBuf::from),
            default_district: get("DEFAULT_DISTRICT"),
            notify_webhook_url: get("NOTIFY_WEBHOOK_URL"),
            notify_recipients: get("NOTIFY_RECIPIENTS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            predict_model_path: get("PREDICT_MODEL_PATH").map(PathBuf::from),
            static_dir: get("STATIC_DIR").map_or_else(|| PathBuf::from("app/dist"), PathBuf::from),
        })
    }
}

fn parse<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e: T::Err| invalid(key, &value, &e.to_string())),
    }
}

fn non_negative(key: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(key, &value.to_string(), "must be a non-negative number"))
    }
}

fn invalid(key: &'static str, value: &str, message: &str) -> ConfigError {
    ConfigError {
        key,
        value: value.to_string(),
        message: message.to_string(),
    }
}
