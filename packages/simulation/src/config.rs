//! Simulation tuning knobs.

use std::time::Duration;

use fire_watch_district::UnknownDistrictPolicy;

/// Tick cadence of the reference deployment.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(3);
/// Radius growth per tick at a spread multiplier of 1.0.
pub const DEFAULT_BASE_SPREAD_RATE: f64 = 0.005;
/// Radius a new fire starts with.
pub const DEFAULT_SEED_RADIUS: f64 = 0.01;
/// Upper bound on one weather lookup.
pub const DEFAULT_WEATHER_TIMEOUT: Duration = Duration::from_secs(5);
/// Probability reported for districts with no fire.
pub const DEFAULT_IDLE_PROBABILITY: f64 = 0.1;
/// Probability reported for the district on fire.
pub const DEFAULT_BURNING_PROBABILITY: f64 = 0.99;

/// Parameters of the spread model and the broadcast loop.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Time between broadcast ticks.
    pub tick_interval: Duration,
    /// Radius growth per tick before the weather multiplier.
    pub base_spread_rate: f64,
    /// Radius of a newly started fire.
    pub seed_radius: f64,
    /// Bound on each weather fetch; slower fetches count as "no data".
    pub weather_timeout: Duration,
    /// Probability for quiet districts.
    pub idle_probability: f64,
    /// Probability for the burning district.
    pub burning_probability: f64,
    /// How alerts for unregistered districts are handled.
    pub unknown_district_policy: UnknownDistrictPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            base_spread_rate: DEFAULT_BASE_SPREAD_RATE,
            seed_radius: DEFAULT_SEED_RADIUS,
            weather_timeout: DEFAULT_WEATHER_TIMEOUT,
            idle_probability: DEFAULT_IDLE_PROBABILITY,
            burning_probability: DEFAULT_BURNING_PROBABILITY,
            unknown_district_policy: UnknownDistrictPolicy::FallbackToDefault,
        }
    }
}
