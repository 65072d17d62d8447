#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fire alert notifications.
//!
//! When a new simulated fire starts, residents of the district are
//! notified (by SMS through a webhook gateway in production). Delivery is
//! fire-and-forget: [`dispatch`] spawns the send, logs the outcome, and
//! never retries. Nothing about a notification failure feeds back into
//! the simulation.

pub mod webhook;

pub use webhook::WebhookNotifier;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fire_watch_simulation_models::Coordinates;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors from notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request to the gateway failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway refused the message.
    #[error("Notification gateway returned HTTP {status}")]
    Rejected {
        /// The HTTP status code.
        status: u16,
    },
}

/// A new fire that people should hear about.
#[derive(Debug, Clone, PartialEq)]
pub struct FireAlert {
    /// District on fire.
    pub district: String,
    /// The district's reference coordinates.
    pub coordinates: Coordinates,
    /// When the simulated fire started.
    pub started_at: DateTime<Utc>,
}

impl FireAlert {
    /// Human-readable message body (fits in two SMS segments).
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "FIRE ALERT: wildfire reported in {} ({:.4}, {:.4}) at {} UTC. \
             Stay alert and follow local evacuation guidance.",
            self.district,
            self.coordinates.latitude,
            self.coordinates.longitude,
            self.started_at.format("%H:%M"),
        )
    }
}

/// Something that can deliver a [`FireAlert`].
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one alert.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if delivery fails.
    async fn notify(&self, alert: &FireAlert) -> Result<(), NotifyError>;
}

/// Notifier that only writes the alert to the log.
///
/// Used when no gateway is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &FireAlert) -> Result<(), NotifyError> {
        log::info!("[notify] {}", alert.message());
        Ok(())
    }
}

/// Sends `alert` on a background task and logs the result.
///
/// Must be called from within a Tokio runtime. The returned handle may be
/// dropped; the send keeps running.
pub fn dispatch(notifier: Arc<dyn Notifier>, alert: FireAlert) -> JoinHandle<()> {
    tokio::spawn(async move {
        match notifier.notify(&alert).await {
            Ok(()) => log::info!("Notification sent for {}", alert.district),
            Err(e) => log::warn!("Notification for {} failed: {e}", alert.district),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing(AtomicUsize);

    #[async_trait::async_trait]
    impl Notifier for Failing {
        async fn notify(&self, _alert: &FireAlert) -> Result<(), NotifyError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(NotifyError::Rejected { status: 503 })
        }
    }

    fn alert() -> FireAlert {
        FireAlert {
            district: "Nainital".to_string(),
            coordinates: Coordinates::new(29.3919, 79.4542),
            started_at: DateTime::parse_from_rfc3339("2025-04-20T09:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn message_names_district_and_time() {
        let message = alert().message();
        assert!(message.contains("Nainital"));
        assert!(message.contains("29.3919"));
        assert!(message.contains("09:30"));
    }

    #[tokio::test]
    async fn dispatch_swallows_failures_without_retry() {
        let notifier = Arc::new(Failing(AtomicUsize::new(0)));
        dispatch(notifier.clone(), alert()).await.unwrap();
        assert_eq!(notifier.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        assert!(LogNotifier.notify(&alert()).await.is_ok());
    }
}
