#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fire probability classifier.
//!
//! Answers "how likely is a fire under these conditions?" for ad-hoc
//! weather inputs. The model is trained offline on the UCI Forest Fires
//! dataset (temperature, relative humidity, wind) and shipped as a small
//! JSON artifact of logistic-regression coefficients. A default artifact
//! is embedded in the binary; another can be loaded from disk.
//!
//! This is deliberately unrelated to the simulation's spread formula. The
//! two answer different questions and are never reconciled.

use std::path::Path;

use fire_watch_simulation_models::RiskLevel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The embedded default model artifact.
const EMBEDDED_MODEL: &str = include_str!("../models/fire_model.json");

/// Errors from loading a model or predicting.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Model artifact could not be read.
    #[error("Failed to read model {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Model artifact is not valid JSON or has missing fields.
    #[error("Invalid model artifact: {0}")]
    Artifact(#[from] serde_json::Error),

    /// A model coefficient is NaN or infinite.
    #[error("Model coefficient {name} is not finite")]
    NonFiniteCoefficient {
        /// The offending coefficient.
        name: &'static str,
    },

    /// The prediction input is out of range.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong.
        message: String,
    },
}

/// Weather conditions to classify.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    /// Temperature, degrees Celsius.
    pub temp: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Wind speed, km/h.
    pub wind_speed: f64,
}

impl PredictionInput {
    /// Checks the input is physically plausible.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::InvalidInput`] for non-finite values,
    /// humidity outside 0-100, or negative wind speed.
    pub fn validate(&self) -> Result<(), PredictError> {
        let invalid = |message: &str| {
            Err(PredictError::InvalidInput {
                message: message.to_string(),
            })
        };

        if !(self.temp.is_finite() && self.humidity.is_finite() && self.wind_speed.is_finite()) {
            return invalid("all fields must be finite numbers");
        }
        if !(0.0..=100.0).contains(&self.humidity) {
            return invalid("humidity must be between 0 and 100");
        }
        if self.wind_speed < 0.0 {
            return invalid("wind_speed must not be negative");
        }
        Ok(())
    }
}

/// Classifier result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Fire probability in `[0, 1]`.
    pub probability: f64,
    /// Bucketed risk level.
    pub risk_level: RiskLevel,
    /// The input that was classified.
    pub input: PredictionInput,
}

/// A model that estimates fire probability from weather.
pub trait FireClassifier: Send + Sync {
    /// Probability of fire for `input`. Implementations may return values
    /// slightly outside `[0, 1]`; [`predict`] clamps.
    fn probability(&self, input: &PredictionInput) -> f64;
}

/// Logistic regression over (temp, humidity, wind speed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Artifact name, for logs.
    #[serde(default)]
    pub name: Option<String>,
    /// Bias term.
    pub intercept: f64,
    /// Temperature coefficient.
    pub temp: f64,
    /// Humidity coefficient.
    pub humidity: f64,
    /// Wind speed coefficient.
    pub wind_speed: f64,
}

impl LogisticModel {
    /// Returns the model embedded in the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded artifact is invalid. It is a compile-time
    /// constant, so this is caught by tests.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json(EMBEDDED_MODEL)
            .unwrap_or_else(|e| panic!("Failed to load embedded fire model: {e}"))
    }

    /// Parses and validates a model artifact.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError`] if the JSON is malformed or any
    /// coefficient is not finite.
    pub fn from_json(json: &str) -> Result<Self, PredictError> {
        let model: Self = serde_json::from_str(json)?;
        for (name, value) in [
            ("intercept", model.intercept),
            ("temp", model.temp),
            ("humidity", model.humidity),
            ("wind_speed", model.wind_speed),
        ] {
            if !value.is_finite() {
                return Err(PredictError::NonFiniteCoefficient { name });
            }
        }
        Ok(model)
    }

    /// Loads a model artifact from disk.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`Self::from_json`].
    pub fn from_file(path: &Path) -> Result<Self, PredictError> {
        let json = std::fs::read_to_string(path).map_err(|source| PredictError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let model = Self::from_json(&json)?;
        log::info!(
            "Loaded fire model {} from {}",
            model.name.as_deref().unwrap_or("<unnamed>"),
            path.display()
        );
        Ok(model)
    }
}

impl FireClassifier for LogisticModel {
    fn probability(&self, input: &PredictionInput) -> f64 {
        let z = self.intercept
            + self.temp * input.temp
            + self.humidity * input.humidity
            + self.wind_speed * input.wind_speed;
        1.0 / (1.0 + (-z).exp())
    }
}

/// Validates `input` and classifies it.
///
/// # Errors
///
/// Returns [`PredictError::InvalidInput`] if the input fails
/// [`PredictionInput::validate`].
pub fn predict(
    classifier: &dyn FireClassifier,
    input: PredictionInput,
) -> Result<Prediction, PredictError> {
    input.validate()?;

    let raw = classifier.probability(&input);
    let probability = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };

    Ok(Prediction {
        probability,
        risk_level: RiskLevel::from_probability(probability),
        input,
    })
}
