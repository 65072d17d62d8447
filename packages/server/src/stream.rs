//! Live risk stream.
//!
//! `GET /api/risk/stream` is a Server-Sent Events stream. Each published
//! snapshot becomes one `risk_update` event whose data is the snapshot
//! as JSON. A new subscriber first receives the latest snapshot, then
//! every later one. A subscriber that falls behind skips to the newest
//! snapshot instead of holding up the broadcast.

use std::convert::Infallible;

use actix_web::web::Bytes;
use actix_web::{HttpResponse, http::header, web};
use fire_watch_simulation_models::RiskSnapshot;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::AppState;

/// SSE event name for risk snapshots.
pub const RISK_EVENT: &str = "risk_update";

/// Logs a subscriber's arrival, and its departure when dropped together
/// with the response stream.
struct Subscription {
    id: Uuid,
}

impl Subscription {
    fn open(subscribers: usize) -> Self {
        let id = Uuid::new_v4();
        log::info!("Risk stream client {id} connected ({subscribers} subscribed)");
        Self { id }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        log::info!("Risk stream client {} disconnected", self.id);
    }
}

/// Formats `snapshot` as one SSE event.
pub fn risk_event(snapshot: &RiskSnapshot) -> Option<Bytes> {
    match serde_json::to_string(snapshot) {
        Ok(data) => Some(Bytes::from(format!("event: {RISK_EVENT}\ndata: {data}\n\n"))),
        Err(e) => {
            log::error!("Failed to serialize risk snapshot: {e}");
            None
        }
    }
}

/// `GET /api/risk/stream`
pub async fn risk_stream(state: web::Data<AppState>) -> HttpResponse {
    let mut rx = state.broadcaster.subscribe();
    let latest = state.broadcaster.latest();
    let subscription = Subscription::open(state.broadcaster.subscriber_count());

    let events = async_stream::stream! {
        if let Some(event) = risk_event(&latest) {
            yield Ok::<_, Infallible>(event);
        }

        loop {
            match rx.recv().await {
                Ok(snapshot) => {
                    if let Some(event) = risk_event(&snapshot) {
                        yield Ok(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!(
                        "Risk stream client {} lagged, skipped {skipped} snapshots",
                        subscription.id
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::body::{BoxBody, MessageBody as _};
    use actix_web::App;
    use fire_watch_district::{DistrictRegistry, UnknownDistrictPolicy};
    use fire_watch_notify::LogNotifier;
    use fire_watch_predict::LogisticModel;
    use fire_watch_simulation::{AlertIntake, RiskBroadcaster, SharedFireState};

    use crate::configure;

    fn app_state() -> web::Data<AppState> {
        let registry = Arc::new(DistrictRegistry::embedded());
        let intake = AlertIntake::new(
            registry.clone(),
            SharedFireState::new(),
            Arc::new(LogNotifier),
            UnknownDistrictPolicy::FallbackToDefault,
            0.01,
        );
        let broadcaster = RiskBroadcaster::new(RiskSnapshot::quiet(registry.names(), 0.1));
        web::Data::new(AppState {
            registry,
            intake,
            broadcaster,
            classifier: Arc::new(LogisticModel::embedded()),
        })
    }

    fn parse_event(chunk: &[u8]) -> (String, serde_json::Value) {
        let text = std::str::from_utf8(chunk).unwrap();
        assert!(text.ends_with("\n\n"));
        let mut lines = text.lines();
        let event = lines.next().unwrap().strip_prefix("event: ").unwrap();
        let data = lines.next().unwrap().strip_prefix("data: ").unwrap();
        (event.to_string(), serde_json::from_str(data).unwrap())
    }

    async fn next_chunk(body: &mut Pin<Box<BoxBody>>) -> Bytes {
        tokio::time::timeout(
            Duration::from_secs(1),
            futures::future::poll_fn(|cx| body.as_mut().poll_next(cx)),
        )
        .await
        .unwrap()
        .unwrap()
        .unwrap()
    }

    #[test]
    fn event_carries_snapshot_json() {
        let snapshot = RiskSnapshot::quiet(["Almora", "Chamoli"], 0.1);
        let (event, data) = parse_event(&risk_event(&snapshot).unwrap());
        assert_eq!(event, "risk_update");
        assert_eq!(data["Almora"]["risk_level"], "Low");
        assert_eq!(data["Chamoli"]["radius"], 0.0);
    }

    #[actix_web::test]
    async fn stream_sends_latest_then_published() {
        let state = app_state();
        let app = actix_web::test::init_service(
            App::new().app_data(state.clone()).configure(configure),
        )
        .await;

        let req = actix_web::test::TestRequest::get()
            .uri("/api/risk/stream")
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
        assert_eq!(state.broadcaster.subscriber_count(), 1);

        let mut body = Box::pin(resp.into_body());

        let (event, data) = parse_event(&next_chunk(&mut body).await);
        assert_eq!(event, RISK_EVENT);
        assert_eq!(data.as_object().unwrap().len(), 13);

        state
            .broadcaster
            .publish(Arc::new(RiskSnapshot::quiet(["Almora"], 0.1)));
        let (_, data) = parse_event(&next_chunk(&mut body).await);
        assert_eq!(data.as_object().unwrap().len(), 1);

        drop(body);
        assert_eq!(state.broadcaster.subscriber_count(), 0);
    }
}
