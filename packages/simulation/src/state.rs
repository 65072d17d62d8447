//! The single mutable record of the simulated fire.
//!
//! [`FireState`] makes "active without a district" unrepresentable. All
//! access goes through [`SharedFireState`], which keeps the record behind
//! one mutex so a reader never sees a half-applied update. Every method is
//! synchronous; the lock is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use fire_watch_simulation_models::FireStatus;

/// A fire in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveFire {
    /// Increments with every new fire, so a tick can tell whether the fire
    /// it started working on is still the current one.
    pub generation: u64,
    /// District on fire.
    pub district: String,
    /// Current radius. Never decreases.
    pub radius: f64,
    /// When the fire started.
    pub started_at: DateTime<Utc>,
}

/// Whether a fire is being simulated.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FireState {
    /// No fire.
    #[default]
    Idle,
    /// A fire is burning.
    Burning(ActiveFire),
}

impl FireState {
    /// Returns `true` if a fire is burning.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Burning(_))
    }
}

/// Result of recording an alert against the state.
#[derive(Debug, Clone, PartialEq)]
pub enum Ignition {
    /// No fire was burning; this one just started.
    Started(ActiveFire),
    /// A fire was already burning and was left untouched.
    AlreadyBurning(ActiveFire),
}

#[derive(Debug, Default)]
struct Inner {
    fire: FireState,
    last_alert: Option<String>,
    generation: u64,
}

/// Cloneable handle to the shared fire record.
#[derive(Debug, Clone, Default)]
pub struct SharedFireState {
    inner: Arc<Mutex<Inner>>,
}

impl SharedFireState {
    /// Creates an idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Poisoning is ignored: every update is a single assignment, so the
    /// record is consistent even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a fire in `district` unless one is already burning.
    ///
    /// The check and the write happen under one lock. `requested`, the
    /// name the alert carried before any default was substituted, is
    /// remembered as the latest alert either way.
    pub fn record_alert(&self, requested: &str, district: &str, seed_radius: f64) -> Ignition {
        let mut inner = self.lock();
        inner.last_alert = Some(requested.to_string());

        if let FireState::Burning(fire) = &inner.fire {
            return Ignition::AlreadyBurning(fire.clone());
        }

        inner.generation += 1;
        let fire = ActiveFire {
            generation: inner.generation,
            district: district.to_string(),
            radius: seed_radius.max(0.0),
            started_at: Utc::now(),
        };
        inner.fire = FireState::Burning(fire.clone());
        Ignition::Started(fire)
    }

    /// Grows the fire of the given `generation` by `growth`.
    ///
    /// Returns the updated fire, or `None` if that fire is no longer
    /// burning (extinguished, or replaced by a newer one). Growth that is
    /// negative or not finite is ignored, so the radius never decreases.
    pub fn advance(&self, generation: u64, growth: f64) -> Option<ActiveFire> {
        let mut inner = self.lock();
        match &mut inner.fire {
            FireState::Burning(fire) if fire.generation == generation => {
                if growth.is_finite() && growth > 0.0 {
                    fire.radius += growth;
                }
                Some(fire.clone())
            }
            _ => None,
        }
    }

    /// Puts the fire out. Returns the fire that was burning, if any.
    pub fn extinguish(&self) -> Option<ActiveFire> {
        let mut inner = self.lock();
        match std::mem::take(&mut inner.fire) {
            FireState::Burning(fire) => Some(fire),
            FireState::Idle => None,
        }
    }

    /// A copy of the current fire state.
    #[must_use]
    pub fn current(&self) -> FireState {
        self.lock().fire.clone()
    }

    /// Read-only status for the API.
    #[must_use]
    pub fn status(&self) -> FireStatus {
        let inner = self.lock();
        let last_alert = inner.last_alert.clone();
        match &inner.fire {
            FireState::Idle => FireStatus {
                active: false,
                district: None,
                radius: 0.0,
                started_at: None,
                last_alert,
            },
            FireState::Burning(fire) => FireStatus {
                active: true,
                district: Some(fire.district.clone()),
                radius: fire.radius,
                started_at: Some(fire.started_at),
                last_alert,
            },
        }
    }
}
