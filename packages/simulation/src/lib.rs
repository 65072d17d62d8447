#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Wildfire spread simulation and risk broadcast loop.
//!
//! One simulated fire at a time. Alerts start it ([`alert`]), the
//! broadcast loop grows it every tick at a weather-driven rate
//! ([`spread`], [`engine`]) and publishes a full per-district
//! [`RiskSnapshot`](fire_watch_simulation_models::RiskSnapshot) to every
//! subscriber ([`broadcast`]).
//!
//! Alerts and ticks run on independent schedules and share exactly one
//! piece of mutable state, [`state::SharedFireState`], behind a single
//! mutex. The loop itself runs under a [`supervisor`] that restarts it if
//! it ever dies.

pub mod alert;
pub mod broadcast;
pub mod config;
pub mod engine;
pub mod spread;
pub mod state;
pub mod supervisor;

pub use alert::{AlertIntake, AlertOutcome};
pub use broadcast::RiskBroadcaster;
pub use config::SimulationConfig;
pub use engine::SimulationEngine;
pub use state::SharedFireState;
