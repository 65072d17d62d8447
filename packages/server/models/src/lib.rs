#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the fire watch server.
//!
//! These types are serialized to JSON for the REST API and the live risk
//! stream. Field names are `snake_case` to match the dashboard client.
//! They are separate from the simulation types to allow independent
//! evolution of the API contract.

use fire_watch_district::{District, DistrictRegistry};
use fire_watch_predict::{Prediction, PredictionInput};
use fire_watch_simulation_models::RiskLevel;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Clients currently subscribed to the risk stream.
    pub subscribers: usize,
}

/// A district as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDistrict {
    /// District name.
    pub name: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl From<&District> for ApiDistrict {
    fn from(district: &District) -> Self {
        Self {
            name: district.name.clone(),
            latitude: district.coordinates.latitude,
            longitude: district.coordinates.longitude,
        }
    }
}

/// The district registry as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDistricts {
    /// District substituted for unknown alert names.
    pub default: String,
    /// All districts in registry order.
    pub districts: Vec<ApiDistrict>,
}

impl From<&DistrictRegistry> for ApiDistricts {
    fn from(registry: &DistrictRegistry) -> Self {
        Self {
            default: registry.default_district().name.clone(),
            districts: registry.districts().iter().map(ApiDistrict::from).collect(),
        }
    }
}

/// Body of `POST /api/alert`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertRequest {
    /// District where fire was spotted. Missing means the default
    /// district.
    #[serde(default)]
    pub district: Option<String>,
}

/// Response of `POST /api/fire/extinguish`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtinguishResponse {
    /// District whose fire was put out, if one was burning.
    pub extinguished: Option<String>,
}

/// Body of `POST /api/predict`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Temperature, degrees Celsius.
    pub temp: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Wind speed, km/h.
    pub wind_speed: f64,
}

impl From<PredictRequest> for PredictionInput {
    fn from(req: PredictRequest) -> Self {
        Self {
            temp: req.temp,
            humidity: req.humidity,
            wind_speed: req.wind_speed,
        }
    }
}

impl From<PredictionInput> for PredictRequest {
    fn from(input: PredictionInput) -> Self {
        Self {
            temp: input.temp,
            humidity: input.humidity,
            wind_speed: input.wind_speed,
        }
    }
}

/// Response of `POST /api/predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Fire probability in `[0, 1]`.
    pub probability: f64,
    /// Bucketed risk level.
    pub risk_level: RiskLevel,
    /// The input, echoed back.
    pub input: PredictRequest,
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            probability: prediction.probability,
            risk_level: prediction.risk_level,
            input: prediction.input.into(),
        }
    }
}

/// Error body returned with 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
}
