//! Alert intake.
//!
//! An alert names a district where a fire has been spotted. If nothing is
//! burning, the simulation starts a fire there and residents are notified
//! once. If a fire is already burning anywhere, the alert changes nothing:
//! only one fire is simulated at a time and later alerts are dropped, not
//! queued.

use std::sync::Arc;

use fire_watch_district::{DistrictRegistry, UnknownDistrictPolicy};
use fire_watch_notify::{FireAlert, Notifier};
use serde::Serialize;

use crate::state::{Ignition, SharedFireState};

/// What an alert did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AlertOutcome {
    /// A new fire started in `district`.
    Ignited {
        /// District now on fire.
        district: String,
        /// `true` if `district` is the default, substituted for an
        /// unregistered name.
        substituted: bool,
    },
    /// A fire was already burning; nothing changed.
    AlreadyBurning {
        /// District of the fire that keeps burning.
        active: String,
        /// District the alert asked for.
        requested: String,
    },
    /// The name is not registered and the policy refuses unknown names.
    Rejected {
        /// The name as received.
        requested: String,
    },
}

/// Applies alerts to the shared fire state.
pub struct AlertIntake {
    registry: Arc<DistrictRegistry>,
    state: SharedFireState,
    notifier: Arc<dyn Notifier>,
    policy: UnknownDistrictPolicy,
    seed_radius: f64,
}

impl AlertIntake {
    /// Creates an intake over `state`.
    #[must_use]
    pub fn new(
        registry: Arc<DistrictRegistry>,
        state: SharedFireState,
        notifier: Arc<dyn Notifier>,
        policy: UnknownDistrictPolicy,
        seed_radius: f64,
    ) -> Self {
        Self {
            registry,
            state,
            notifier,
            policy,
            seed_radius,
        }
    }

    /// Handles one alert. Never fails.
    ///
    /// On a new fire the notification is dispatched on a background task
    /// after the state lock has been released, so this must run inside a
    /// Tokio runtime.
    pub fn report_alert(&self, district: &str) -> AlertOutcome {
        let requested = district.trim();
        let resolution = match self.registry.resolve(district, self.policy) {
            Ok(resolution) => resolution,
            Err(e) => {
                log::warn!("Alert rejected: {e}");
                return AlertOutcome::Rejected {
                    requested: requested.to_string(),
                };
            }
        };

        let target = resolution.district;
        if resolution.substituted {
            log::warn!(
                "Alert for unknown district {district:?}, using default {}",
                target.name
            );
        }

        match self
            .state
            .record_alert(requested, &target.name, self.seed_radius)
        {
            Ignition::Started(fire) => {
                log::info!("Starting new fire simulation in {}", fire.district);
                fire_watch_notify::dispatch(
                    self.notifier.clone(),
                    FireAlert {
                        district: fire.district.clone(),
                        coordinates: target.coordinates,
                        started_at: fire.started_at,
                    },
                );
                AlertOutcome::Ignited {
                    district: fire.district,
                    substituted: resolution.substituted,
                }
            }
            Ignition::AlreadyBurning(fire) => {
                log::info!(
                    "Alert for {requested} ignored, fire already burning in {}",
                    fire.district
                );
                AlertOutcome::AlreadyBurning {
                    active: fire.district,
                    requested: requested.to_string(),
                }
            }
        }
    }

    /// The state this intake writes to.
    #[must_use]
    pub const fn state(&self) -> &SharedFireState {
        &self.state
    }
}
