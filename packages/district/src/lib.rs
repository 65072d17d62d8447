#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! District registry for the wildfire simulation.
//!
//! The registry is the fixed universe of districts reported in every risk
//! snapshot. It is defined in TOML (see `districts/uttarakhand.toml`),
//! embedded at compile time, and can be replaced at startup with a file
//! on disk. The registry is immutable once built.
//!
//! Alerts may name districts that are not in the registry. What happens
//! then is an explicit [`UnknownDistrictPolicy`]: by default the name is
//! replaced with the registry's default district.

use std::path::Path;

use fire_watch_simulation_models::Coordinates;
use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Number of districts in the embedded registry. Enforced by a test.
#[cfg(test)]
const EXPECTED_DISTRICT_COUNT: usize = 13;

/// The embedded Uttarakhand registry.
const EMBEDDED_TOML: &str = include_str!("../districts/uttarakhand.toml");

/// Errors from building or querying a [`DistrictRegistry`].
#[derive(Debug, Error)]
pub enum DistrictError {
    /// Registry file could not be read.
    #[error("Failed to read district registry {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Registry TOML is malformed.
    #[error("Failed to parse district registry: {0}")]
    Parse(#[from] toml::de::Error),

    /// Registry contains no districts.
    #[error("District registry is empty")]
    Empty,

    /// A district has an empty name.
    #[error("District registry contains an entry with an empty name")]
    EmptyName,

    /// Two entries share a name.
    #[error("Duplicate district: {name}")]
    Duplicate {
        /// The repeated name.
        name: String,
    },

    /// A district's coordinates are not valid WGS84.
    #[error("Invalid coordinates for district {name}")]
    InvalidCoordinates {
        /// The offending district.
        name: String,
    },

    /// The configured default district is not in the registry.
    #[error("Default district {name} is not in the registry")]
    UnknownDefault {
        /// The missing default.
        name: String,
    },

    /// A lookup named a district that is not in the registry and the
    /// policy does not allow substitution.
    #[error("Unknown district: {name}")]
    Unknown {
        /// The name that was looked up.
        name: String,
    },
}

/// What to do with an alert for a district that is not in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum UnknownDistrictPolicy {
    /// Substitute the registry's default district.
    #[default]
    #[strum(serialize = "fallback")]
    FallbackToDefault,
    /// Refuse the name.
    #[strum(serialize = "reject")]
    Reject,
}

/// A named district with its reference coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct District {
    /// Unique district name.
    pub name: String,
    /// Headquarters coordinates, used for weather lookups.
    pub coordinates: Coordinates,
}

/// Outcome of resolving a name against the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    /// The district the name resolved to.
    pub district: &'a District,
    /// `true` if the default district was substituted for an unknown name.
    pub substituted: bool,
}

#[derive(Deserialize)]
struct RegistryFile {
    default: String,
    districts: Vec<DistrictEntry>,
}

#[derive(Deserialize)]
struct DistrictEntry {
    name: String,
    latitude: f64,
    longitude: f64,
}

/// Immutable, validated set of districts.
#[derive(Debug, Clone)]
pub struct DistrictRegistry {
    districts: Vec<District>,
    default_index: usize,
}

impl DistrictRegistry {
    /// Returns the registry embedded in the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is invalid. Since it is a compile-time
    /// constant, a failure here is a development error caught by tests.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml_str(EMBEDDED_TOML)
            .unwrap_or_else(|e| panic!("Failed to load embedded district registry: {e}"))
    }

    /// Parses and validates a registry from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`DistrictError`] if the TOML is malformed or the registry
    /// fails validation (empty, duplicate names, bad coordinates, unknown
    /// default).
    pub fn from_toml_str(toml_str: &str) -> Result<Self, DistrictError> {
        let file: RegistryFile = toml::de::from_str(toml_str)?;
        let districts = file
            .districts
            .into_iter()
            .map(|entry| District {
                name: entry.name.trim().to_string(),
                coordinates: Coordinates::new(entry.latitude, entry.longitude),
            })
            .collect();
        Self::new(districts, file.default.trim())
    }

    /// Reads a registry TOML file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DistrictError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`Self::from_toml_str`].
    pub fn from_file(path: &Path) -> Result<Self, DistrictError> {
        let text = std::fs::read_to_string(path).map_err(|source| DistrictError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_toml_str(&text)?;
        log::info!(
            "Loaded {} districts from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Builds a registry from explicit districts.
    ///
    /// # Errors
    ///
    /// Returns [`DistrictError`] if the list is empty, contains empty or
    /// duplicate names or invalid coordinates, or `default` is missing.
    pub fn new(districts: Vec<District>, default: &str) -> Result<Self, DistrictError> {
        if districts.is_empty() {
            return Err(DistrictError::Empty);
        }

        for (i, district) in districts.iter().enumerate() {
            if district.name.is_empty() {
                return Err(DistrictError::EmptyName);
            }
            if !district.coordinates.is_valid() {
                return Err(DistrictError::InvalidCoordinates {
                    name: district.name.clone(),
                });
            }
            if districts[..i].iter().any(|d| d.name == district.name) {
                return Err(DistrictError::Duplicate {
                    name: district.name.clone(),
                });
            }
        }

        let default_index = districts
            .iter()
            .position(|d| d.name == default)
            .ok_or_else(|| DistrictError::UnknownDefault {
                name: default.to_string(),
            })?;

        Ok(Self {
            districts,
            default_index,
        })
    }

    /// Returns a copy of this registry with a different default district.
    ///
    /// # Errors
    ///
    /// Returns [`DistrictError::UnknownDefault`] if `name` is not registered.
    pub fn with_default(mut self, name: &str) -> Result<Self, DistrictError> {
        let name = name.trim();
        self.default_index = self
            .districts
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| DistrictError::UnknownDefault {
                name: name.to_string(),
            })?;
        Ok(self)
    }

    /// Looks up a district by exact (trimmed) name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&District> {
        let name = name.trim();
        self.districts.iter().find(|d| d.name == name)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The district substituted for unknown names.
    #[must_use]
    pub fn default_district(&self) -> &District {
        &self.districts[self.default_index]
    }

    /// All districts in registry order.
    #[must_use]
    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    /// District names in registry order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.districts.iter().map(|d| d.name.as_str())
    }

    /// Number of registered districts. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.districts.len()
    }

    /// Always `false`; an empty registry cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    /// Coordinates for `name`, or the default district's when `name` is
    /// not registered.
    #[must_use]
    pub fn coordinates_or_default(&self, name: &str) -> Coordinates {
        self.get(name)
            .unwrap_or_else(|| self.default_district())
            .coordinates
    }

    /// Resolves an alert's district name under `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`DistrictError::Unknown`] only when the name is not
    /// registered and the policy is [`UnknownDistrictPolicy::Reject`].
    pub fn resolve(
        &self,
        name: &str,
        policy: UnknownDistrictPolicy,
    ) -> Result<Resolution<'_>, DistrictError> {
        if let Some(district) = self.get(name) {
            return Ok(Resolution {
                district,
                substituted: false,
            });
        }

        match policy {
            UnknownDistrictPolicy::FallbackToDefault => Ok(Resolution {
                district: self.default_district(),
                substituted: true,
            }),
            UnknownDistrictPolicy::Reject => Err(DistrictError::Unknown {
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_embedded_registry() {
        let registry = DistrictRegistry::embedded();
        assert_eq!(
            registry.len(),
            EXPECTED_DISTRICT_COUNT,
            "Expected {EXPECTED_DISTRICT_COUNT} districts, found {}. \
             Update EXPECTED_DISTRICT_COUNT after adding/removing districts.",
            registry.len()
        );
        assert_eq!(registry.default_district().name, "Dehradun");
    }

    #[test]
    fn district_names_are_unique() {
        let registry = DistrictRegistry::embedded();
        let mut seen = BTreeSet::new();
        for name in registry.names() {
            assert!(seen.insert(name), "Duplicate district: {name}");
        }
    }

    #[test]
    fn all_districts_have_valid_coordinates() {
        for district in DistrictRegistry::embedded().districts() {
            assert!(
                district.coordinates.is_valid(),
                "District {} has invalid coordinates",
                district.name
            );
        }
    }

    #[test]
    fn fallback_policy_substitutes_default() {
        let registry = DistrictRegistry::embedded();
        let resolution = registry
            .resolve("Atlantis", UnknownDistrictPolicy::FallbackToDefault)
            .unwrap();
        assert!(resolution.substituted);
        assert_eq!(resolution.district.name, "Dehradun");

        let resolution = registry
            .resolve(" Nainital ", UnknownDistrictPolicy::FallbackToDefault)
            .unwrap();
        assert!(!resolution.substituted);
        assert_eq!(resolution.district.name, "Nainital");
    }

    #[test]
    fn reject_policy_refuses_unknown() {
        let registry = DistrictRegistry::embedded();
        let err = registry
            .resolve("Atlantis", UnknownDistrictPolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, DistrictError::Unknown { name } if name == "Atlantis"));
        assert!(registry.resolve("Almora", UnknownDistrictPolicy::Reject).is_ok());
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(
            "fallback".parse::<UnknownDistrictPolicy>().unwrap(),
            UnknownDistrictPolicy::FallbackToDefault
        );
        assert_eq!(
            "REJECT".parse::<UnknownDistrictPolicy>().unwrap(),
            UnknownDistrictPolicy::Reject
        );
        assert!("ignore".parse::<UnknownDistrictPolicy>().is_err());
    }

    #[test]
    fn rejects_empty_registry() {
        let err = DistrictRegistry::new(Vec::new(), "Dehradun").unwrap_err();
        assert!(matches!(err, DistrictError::Empty));
    }

    #[test]
    fn rejects_duplicates_and_unknown_default() {
        let d = |name: &str| District {
            name: name.to_string(),
            coordinates: Coordinates::new(30.0, 78.0),
        };
        assert!(matches!(
            DistrictRegistry::new(vec![d("A"), d("A")], "A").unwrap_err(),
            DistrictError::Duplicate { .. }
        ));
        assert!(matches!(
            DistrictRegistry::new(vec![d("A"), d("B")], "C").unwrap_err(),
            DistrictError::UnknownDefault { .. }
        ));
    }

    #[test]
    fn with_default_switches_fallback() {
        let registry = DistrictRegistry::embedded().with_default("Almora").unwrap();
        assert_eq!(registry.default_district().name, "Almora");
        assert!(DistrictRegistry::embedded().with_default("Atlantis").is_err());
    }

    #[test]
    fn coordinates_fall_back_to_default() {
        let registry = DistrictRegistry::embedded();
        let dehradun = registry.get("Dehradun").unwrap().coordinates;
        assert_eq!(registry.coordinates_or_default("Atlantis"), dehradun);
    }

    #[test]
    fn parses_custom_toml() {
        let registry = DistrictRegistry::from_toml_str(
            r#"
            default = "Shimla"

            [[districts]]
            name = "Shimla"
            latitude = 31.1048
            longitude = 77.1734
            "#,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("Shimla"));
    }
}
