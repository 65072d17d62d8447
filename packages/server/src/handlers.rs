//! HTTP handler functions for the fire watch API.

use actix_web::{HttpResponse, web};
use fire_watch_predict::PredictError;
use fire_watch_server_models::{
    AlertRequest, ApiDistricts, ApiError, ApiHealth, ExtinguishResponse, PredictRequest,
    PredictResponse,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        subscribers: state.broadcaster.subscriber_count(),
    })
}

/// `GET /api/districts`
///
/// Lists the registered districts and the default one.
pub async fn districts(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiDistricts::from(state.registry.as_ref()))
}

/// `POST /api/alert`
///
/// Reports a fire. Always answers `202 Accepted` with the outcome: an
/// alert while a fire is burning, or for a district the policy rejects,
/// is acknowledged but changes nothing. A missing or unreadable body
/// means the default district.
pub async fn alert(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let request = if body.is_empty() {
        AlertRequest::default()
    } else {
        serde_json::from_slice::<AlertRequest>(&body).unwrap_or_else(|e| {
            log::warn!("Unreadable alert body, using default district: {e}");
            AlertRequest::default()
        })
    };

    let district = request
        .district
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| state.registry.default_district().name.clone());

    HttpResponse::Accepted().json(state.intake.report_alert(&district))
}

/// `GET /api/fire`
pub async fn fire_status(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.intake.state().status())
}

/// `POST /api/fire/extinguish`
///
/// Puts out the active fire, if any. The next tick publishes a quiet
/// snapshot.
pub async fn extinguish(state: web::Data<AppState>) -> HttpResponse {
    let extinguished = state.intake.state().extinguish().map(|fire| {
        log::info!("Fire in {} extinguished", fire.district);
        fire.district
    });
    HttpResponse::Ok().json(ExtinguishResponse { extinguished })
}

/// `GET /api/risk`
///
/// The most recently published snapshot.
pub async fn latest_risk(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.broadcaster.latest().as_ref())
}

/// `POST /api/predict`
///
/// Classifies one set of weather conditions with the risk model.
pub async fn predict(
    state: web::Data<AppState>,
    body: web::Json<PredictRequest>,
) -> HttpResponse {
    match fire_watch_predict::predict(state.classifier.as_ref(), body.into_inner().into()) {
        Ok(prediction) => HttpResponse::Ok().json(PredictResponse::from(prediction)),
        Err(e @ PredictError::InvalidInput { .. }) => {
            HttpResponse::BadRequest().json(ApiError {
                error: e.to_string(),
            })
        }
        Err(e) => {
            log::error!("Prediction failed: {e}");
            HttpResponse::InternalServerError().json(ApiError {
                error: "Prediction failed".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use fire_watch_district::{DistrictRegistry, UnknownDistrictPolicy};
    use fire_watch_notify::LogNotifier;
    use fire_watch_predict::LogisticModel;
    use fire_watch_simulation::{AlertIntake, RiskBroadcaster, SharedFireState};
    use fire_watch_simulation_models::{FireStatus, RiskLevel, RiskSnapshot};
    use serde_json::{Value, json};

    use crate::{AppState, configure};

    fn app_state(policy: UnknownDistrictPolicy) -> web::Data<AppState> {
        let registry = Arc::new(DistrictRegistry::embedded());
        let intake = AlertIntake::new(
            registry.clone(),
            SharedFireState::new(),
            Arc::new(LogNotifier),
            policy,
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

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(
            App::new()
                .app_data(app_state(UnknownDistrictPolicy::FallbackToDefault))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["subscribers"], 0);
    }

    #[actix_web::test]
    async fn districts_lists_registry() {
        let app = test::init_service(
            App::new()
                .app_data(app_state(UnknownDistrictPolicy::FallbackToDefault))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/districts").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["default"], "Dehradun");
        assert_eq!(body["districts"].as_array().unwrap().len(), 13);
    }

    #[actix_web::test]
    async fn alert_then_second_alert_is_acknowledged_only() {
        let state = app_state(UnknownDistrictPolicy::FallbackToDefault);
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/alert")
            .set_json(json!({ "district": "Nainital" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"], "ignited");
        assert_eq!(body["district"], "Nainital");

        let req = test::TestRequest::post()
            .uri("/api/alert")
            .set_json(json!({ "district": "Almora" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"], "already_burning");
        assert_eq!(body["active"], "Nainital");

        let req = test::TestRequest::get().uri("/api/fire").to_request();
        let status: FireStatus = test::call_and_read_body_json(&app, req).await;
        assert!(status.active);
        assert_eq!(status.district.as_deref(), Some("Nainital"));
        assert_eq!(status.last_alert.as_deref(), Some("Almora"));
    }

    #[actix_web::test]
    async fn alert_without_body_uses_default_district() {
        let app = test::init_service(
            App::new()
                .app_data(app_state(UnknownDistrictPolicy::FallbackToDefault))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::post().uri("/api/alert").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["district"], "Dehradun");
        assert_eq!(body["substituted"], false);
    }

    #[actix_web::test]
    async fn garbled_alert_body_uses_default_district() {
        let app = test::init_service(
            App::new()
                .app_data(app_state(UnknownDistrictPolicy::FallbackToDefault))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/alert")
            .set_payload("not json")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["outcome"], "ignited");
        assert_eq!(body["district"], "Dehradun");
    }

    #[actix_web::test]
    async fn rejected_alert_is_still_accepted() {
        let state = app_state(UnknownDistrictPolicy::Reject);
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/alert")
            .set_json(json!({ "district": "Gotham" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"], "rejected");
        assert!(!state.intake.state().current().is_active());
    }

    #[actix_web::test]
    async fn extinguish_clears_fire() {
        let state = app_state(UnknownDistrictPolicy::FallbackToDefault);
        state.intake.report_alert("Chamoli");
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/fire/extinguish")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["extinguished"], "Chamoli");

        let req = test::TestRequest::post()
            .uri("/api/fire/extinguish")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["extinguished"].is_null());
    }

    #[actix_web::test]
    async fn latest_risk_returns_published_snapshot() {
        let state = app_state(UnknownDistrictPolicy::FallbackToDefault);
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/risk").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_object().unwrap().len(), 13);
        assert_eq!(body["Almora"]["risk_level"], "Low");

        let mut snapshot = RiskSnapshot::quiet(state.registry.names(), 0.1);
        let mut almora = snapshot.get("Almora").unwrap().clone();
        almora.risk_level = RiskLevel::High;
        almora.probability = 0.99;
        snapshot.set("Almora", almora);
        state.broadcaster.publish(Arc::new(snapshot));

        let req = test::TestRequest::get().uri("/api/risk").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["Almora"]["risk_level"], "High");
    }

    #[actix_web::test]
    async fn predict_classifies_conditions() {
        let app = test::init_service(
            App::new()
                .app_data(app_state(UnknownDistrictPolicy::FallbackToDefault))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({ "temp": 35.0, "humidity": 25.0, "wind_speed": 10.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["risk_level"], "High");
        assert_eq!(body["input"]["temp"], 35.0);
        let probability = body["probability"].as_f64().unwrap();
        assert!((0.7..=1.0).contains(&probability));
    }

    #[actix_web::test]
    async fn predict_rejects_bad_input() {
        let app = test::init_service(
            App::new()
                .app_data(app_state(UnknownDistrictPolicy::FallbackToDefault))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({ "temp": 30.0, "humidity": 150.0, "wind_speed": 3.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("humidity"));

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({ "temp": "hot" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}
