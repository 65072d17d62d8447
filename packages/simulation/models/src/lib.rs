#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared value types for the wildfire simulation.
//!
//! These types flow between the weather client, the simulation engine,
//! and the HTTP layer. Everything here is plain data: the snapshot
//! published each tick is built fresh and never mutated afterwards.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a new coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if both components are finite and within WGS84 bounds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Current surface weather at a point.
///
/// "No data" is modelled as `Option<WeatherReading>::None` by callers,
/// never as a zeroed reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Air temperature at 2 m, degrees Celsius.
    pub temperature: f64,
    /// Relative humidity at 2 m, percent.
    pub humidity: f64,
    /// Wind speed at 10 m, km/h.
    pub wind_speed: f64,
}

/// Coarse risk classification shown to subscribers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RiskLevel {
    /// No active fire nearby.
    Low,
    /// Elevated conditions.
    Medium,
    /// Active fire or very likely ignition.
    High,
}

impl RiskLevel {
    /// Probability at or above which a prediction is classified `High`.
    pub const HIGH_THRESHOLD: f64 = 0.7;
    /// Probability at or above which a prediction is classified `Medium`.
    pub const MEDIUM_THRESHOLD: f64 = 0.4;

    /// Buckets a fire probability into a risk level.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability >= Self::HIGH_THRESHOLD {
            Self::High
        } else if probability >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// One district's entry in a [`RiskSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictRisk {
    /// Risk classification.
    pub risk_level: RiskLevel,
    /// Fire probability in `[0, 1]`.
    pub probability: f64,
    /// Simulated fire radius (0 when no fire).
    pub radius: f64,
    /// Weather used for this tick, if any was fetched.
    pub weather: Option<WeatherReading>,
}

impl DistrictRisk {
    /// The entry every district starts each tick with.
    #[must_use]
    pub const fn quiet(probability: f64) -> Self {
        Self {
            risk_level: RiskLevel::Low,
            probability,
            radius: 0.0,
            weather: None,
        }
    }
}

/// The complete per-district payload published each tick.
///
/// Serializes as a JSON object keyed by district name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskSnapshot {
    districts: BTreeMap<String, DistrictRisk>,
}

impl RiskSnapshot {
    /// Builds a snapshot where every named district is [`DistrictRisk::quiet`].
    pub fn quiet<'a>(names: impl IntoIterator<Item = &'a str>, probability: f64) -> Self {
        Self {
            districts: names
                .into_iter()
                .map(|name| (name.to_string(), DistrictRisk::quiet(probability)))
                .collect(),
        }
    }

    /// Replaces the entry for `district`. Returns `false` (and leaves the
    /// snapshot untouched) if the district is not part of this snapshot.
    pub fn set(&mut self, district: &str, risk: DistrictRisk) -> bool {
        match self.districts.get_mut(district) {
            Some(entry) => {
                *entry = risk;
                true
            }
            None => false,
        }
    }

    /// Looks up a district's entry.
    #[must_use]
    pub fn get(&self, district: &str) -> Option<&DistrictRisk> {
        self.districts.get(district)
    }

    /// Number of districts in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.districts.len()
    }

    /// Returns `true` if the snapshot has no districts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DistrictRisk)> {
        self.districts.iter().map(|(name, risk)| (name.as_str(), risk))
    }
}

/// Read-only view of the fire simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireStatus {
    /// Whether a fire is currently simulated.
    pub active: bool,
    /// District on fire; `None` exactly when `active` is `false`.
    pub district: Option<String>,
    /// Current radius (0 when idle).
    pub radius: f64,
    /// When the active fire started.
    pub started_at: Option<DateTime<Utc>>,
    /// District named by the most recent alert, accepted or not.
    pub last_alert: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_buckets() {
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.39), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.4), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.69), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.7), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::High);
    }

    #[test]
    fn risk_level_serializes_as_title_case() {
        for level in RiskLevel::all() {
            let json = serde_json::to_string(level).unwrap();
            assert_eq!(json, format!("\"{level}\""));
        }
    }

    #[test]
    fn quiet_snapshot_has_one_entry_per_name() {
        let snapshot = RiskSnapshot::quiet(["Almora", "Nainital", "Almora"], 0.1);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|(_, r)| r.risk_level == RiskLevel::Low));
    }

    #[test]
    fn set_ignores_unknown_district() {
        let mut snapshot = RiskSnapshot::quiet(["Almora"], 0.1);
        assert!(!snapshot.set("Atlantis", DistrictRisk::quiet(0.5)));
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("Atlantis").is_none());
    }

    #[test]
    fn snapshot_serializes_as_object_keyed_by_district() {
        let mut snapshot = RiskSnapshot::quiet(["Nainital"], 0.1);
        snapshot.set(
            "Nainital",
            DistrictRisk {
                risk_level: RiskLevel::High,
                probability: 0.99,
                radius: 0.015,
                weather: None,
            },
        );
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["Nainital"]["risk_level"], "High");
        assert!(value["Nainital"]["weather"].is_null());
    }

    #[test]
    fn coordinates_validation() {
        assert!(Coordinates::new(30.3165, 78.0322).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    }
}
