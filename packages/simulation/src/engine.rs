//! The broadcast loop.
//!
//! Every tick:
//!
//! 1. start from a snapshot where every registered district is quiet;
//! 2. if a fire is burning, fetch live weather at its district (bounded
//!    by a timeout; any failure means "no data");
//! 3. grow the radius by `base_spread_rate * multiplier`;
//! 4. mark the burning district `High` with the new radius and weather;
//! 5. publish the snapshot.
//!
//! A tick always runs to completion. Shutdown is only observed while
//! waiting for the next tick.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use fire_watch_district::DistrictRegistry;
use fire_watch_simulation_models::{
    Coordinates, DistrictRisk, RiskLevel, RiskSnapshot, WeatherReading,
};
use fire_watch_weather::WeatherSource;
use futures::FutureExt as _;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::broadcast::RiskBroadcaster;
use crate::config::SimulationConfig;
use crate::spread::spread_multiplier;
use crate::state::{FireState, SharedFireState};

/// Owns everything a tick needs.
pub struct SimulationEngine {
    config: SimulationConfig,
    registry: Arc<DistrictRegistry>,
    state: SharedFireState,
    weather: Arc<dyn WeatherSource>,
    broadcaster: RiskBroadcaster,
}

impl SimulationEngine {
    /// Creates an engine that advances `state` and publishes through
    /// `broadcaster`.
    #[must_use]
    pub fn new(
        config: SimulationConfig,
        registry: Arc<DistrictRegistry>,
        state: SharedFireState,
        weather: Arc<dyn WeatherSource>,
        broadcaster: RiskBroadcaster,
    ) -> Self {
        Self {
            config,
            registry,
            state,
            weather,
            broadcaster,
        }
    }

    /// The snapshot published while no fire is burning.
    #[must_use]
    pub fn quiet_snapshot(&self) -> RiskSnapshot {
        RiskSnapshot::quiet(self.registry.names(), self.config.idle_probability)
    }

    /// Runs one tick and returns the snapshot it published.
    pub async fn tick(&self) -> Arc<RiskSnapshot> {
        let mut snapshot = self.quiet_snapshot();

        if let FireState::Burning(fire) = self.state.current() {
            let coordinates = self.registry.coordinates_or_default(&fire.district);
            let weather = self.fetch_weather(&fire.district, coordinates).await;
            let growth = self.config.base_spread_rate * spread_multiplier(weather.as_ref());

            // `None` means the fire was put out while we waited on weather.
            if let Some(fire) = self.state.advance(fire.generation, growth) {
                log::debug!(
                    "Fire in {}: radius {:.4} (+{growth:.4})",
                    fire.district,
                    fire.radius
                );
                let marked = snapshot.set(
                    &fire.district,
                    DistrictRisk {
                        risk_level: RiskLevel::High,
                        probability: self.config.burning_probability,
                        radius: fire.radius,
                        weather,
                    },
                );
                if !marked {
                    log::warn!("Burning district {} is not in the registry", fire.district);
                }
            }
        }

        let snapshot = Arc::new(snapshot);
        let delivered = self.broadcaster.publish(snapshot.clone());
        log::trace!("Published risk snapshot to {delivered} subscribers");
        snapshot
    }

    async fn fetch_weather(&self, district: &str, at: Coordinates) -> Option<WeatherReading> {
        match tokio::time::timeout(self.config.weather_timeout, self.weather.current(at)).await {
            Ok(Ok(reading)) => Some(reading),
            Ok(Err(e)) => {
                log::warn!("Weather lookup for {district} failed: {e}");
                None
            }
            Err(_) => {
                log::warn!(
                    "Weather lookup for {district} timed out after {:?}",
                    self.config.weather_timeout
                );
                None
            }
        }
    }

    /// Ticks every `tick_interval` until `shutdown` turns `true` or its
    /// sender is dropped. The first tick fires immediately.
    ///
    /// A tick that panics is logged and skipped; the loop carries on with
    /// the next one.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!(
            "Broadcast loop started ({} districts, every {:?})",
            self.registry.len(),
            self.config.tick_interval
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = interval.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }

            if AssertUnwindSafe(self.tick()).catch_unwind().await.is_err() {
                log::error!("Broadcast tick panicked, skipping to the next tick");
            }
        }

        log::info!("Broadcast loop stopped");
    }
}
