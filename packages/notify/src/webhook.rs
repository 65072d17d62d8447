//! SMS gateway webhook notifier.
//!
//! Posts a JSON body to a configured URL. The body shape is the lowest
//! common denominator accepted by hosted SMS relays:
//!
//! ```json
//! { "to": ["+91..."], "message": "FIRE ALERT: ...", "district": "Nainital" }
//! ```

use std::time::Duration;

use serde::Serialize;

use crate::{FireAlert, NotifyError, Notifier};

/// Upper bound on a single gateway request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Webhook request body.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    to: &'a [String],
    message: String,
    district: &'a str,
}

/// Notifier that POSTs alerts to an SMS gateway.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    recipients: Vec<String>,
}

impl WebhookNotifier {
    /// Creates a notifier for `url` that addresses `recipients`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, recipients: Vec<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            recipients,
        })
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, alert: &FireAlert) -> Result<(), NotifyError> {
        let payload = WebhookPayload {
            to: &self.recipients,
            message: alert.message(),
            district: &alert.district,
        };

        let resp = self.client.post(&self.url).json(&payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        log::debug!(
            "Webhook accepted alert for {} ({} recipients)",
            alert.district,
            self.recipients.len()
        );
        Ok(())
    }
}
