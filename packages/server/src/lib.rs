#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the fire watch simulation.
//!
//! Serves the REST API for reporting fires and querying risk, the live
//! risk stream (SSE at `/api/risk/stream`) and the dashboard's static
//! files. The broadcast loop runs alongside the HTTP server on the same
//! runtime and is stopped once the server has shut down.

pub mod config;
mod handlers;
mod stream;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpResponse, HttpServer, error, middleware, web};
use fire_watch_district::{DistrictError, DistrictRegistry};
use fire_watch_notify::{LogNotifier, Notifier, NotifyError, WebhookNotifier};
use fire_watch_predict::{FireClassifier, LogisticModel, PredictError};
use fire_watch_server_models::ApiError;
use fire_watch_simulation::{
    AlertIntake, RiskBroadcaster, SharedFireState, SimulationEngine, supervisor,
};
use fire_watch_simulation_models::RiskSnapshot;
use fire_watch_weather::WeatherError;
use fire_watch_weather::open_meteo::OpenMeteoClient;
use thiserror::Error;
use tokio::sync::watch;

pub use config::{ConfigError, ServerConfig};

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Environment configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// District registry could not be loaded.
    #[error(transparent)]
    District(#[from] DistrictError),

    /// Weather client could not be built.
    #[error(transparent)]
    Weather(#[from] WeatherError),

    /// Notifier could not be built.
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// Risk model could not be loaded.
    #[error(transparent)]
    Predict(#[from] PredictError),
}

/// Shared application state.
pub struct AppState {
    /// Districts the simulation knows about.
    pub registry: Arc<DistrictRegistry>,
    /// Applies incoming fire alerts.
    pub intake: AlertIntake,
    /// Source of risk snapshots for the stream and polling endpoints.
    pub broadcaster: RiskBroadcaster,
    /// Model behind `POST /api/predict`.
    pub classifier: Arc<dyn FireClassifier>,
}

/// Everything built from a [`ServerConfig`]: the HTTP state and the
/// engine driving the broadcast loop. Both share one fire state and one
/// broadcaster.
pub struct FireWatch {
    /// State handed to the HTTP handlers.
    pub state: AppState,
    /// Engine for the broadcast loop.
    pub engine: Arc<SimulationEngine>,
}

impl FireWatch {
    /// Loads the registry and model and builds the collaborators named
    /// by `config`.
    ///
    /// # Errors
    ///
    /// * [`ServerError::District`] if the registry or default district is
    ///   invalid
    /// * [`ServerError::Predict`] if the model artifact is invalid
    /// * [`ServerError::Weather`] or [`ServerError::Notify`] if an HTTP
    ///   client cannot be built
    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let mut registry = match &config.districts_file {
            Some(path) => {
                log::info!("Loading districts from {}", path.display());
                DistrictRegistry::from_file(path)?
            }
            None => DistrictRegistry::embedded(),
        };
        if let Some(name) = &config.default_district {
            registry = registry.with_default(name)?;
        }
        log::info!(
            "{} districts registered, default {}",
            registry.len(),
            registry.default_district().name
        );
        let registry = Arc::new(registry);

        let classifier: Arc<dyn FireClassifier> = match &config.predict_model_path {
            Some(path) => {
                log::info!("Loading risk model from {}", path.display());
                Arc::new(LogisticModel::from_file(path)?)
            }
            None => Arc::new(LogisticModel::embedded()),
        };

        let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
            Some(url) => {
                log::info!(
                    "Notifications go to webhook {url} ({} recipients)",
                    config.notify_recipients.len()
                );
                Arc::new(WebhookNotifier::new(
                    url.clone(),
                    config.notify_recipients.clone(),
                )?)
            }
            None => {
                log::info!("No notification webhook configured, alerts are only logged");
                Arc::new(LogNotifier)
            }
        };

        let weather = Arc::new(OpenMeteoClient::new(
            config.weather_base_url.clone(),
            config.simulation.weather_timeout,
        )?);

        let fire_state = SharedFireState::new();
        let intake = AlertIntake::new(
            registry.clone(),
            fire_state.clone(),
            notifier,
            config.simulation.unknown_district_policy,
            config.simulation.seed_radius,
        );

        let quiet = RiskSnapshot::quiet(
            registry.names(),
            config.simulation.idle_probability,
        );
        let broadcaster = RiskBroadcaster::new(quiet);

        let engine = Arc::new(SimulationEngine::new(
            config.simulation.clone(),
            registry.clone(),
            fire_state,
            weather,
            broadcaster.clone(),
        ));

        Ok(Self {
            state: AppState {
                registry,
                intake,
                broadcaster,
                classifier,
            },
            engine,
        })
    }
}

/// Registers the `/api` routes.
///
/// Malformed JSON bodies are answered with `400` and an [`ApiError`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let body = ApiError {
            error: err.to_string(),
        };
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    }))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/districts", web::get().to(handlers::districts))
            .route("/alert", web::post().to(handlers::alert))
            .route("/fire", web::get().to(handlers::fire_status))
            .route("/fire/extinguish", web::post().to(handlers::extinguish))
            .route("/risk", web::get().to(handlers::latest_risk))
            .route("/risk/stream", web::get().to(stream::risk_stream))
            .route("/predict", web::post().to(handlers::predict)),
    );
}

/// Starts the fire watch server.
///
/// Reads the configuration from the environment, builds the simulation,
/// starts the supervised broadcast loop and runs the Actix-Web HTTP
/// server. When the server stops, the loop is told to shut down and is
/// awaited. The caller is responsible for providing the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration is invalid,
/// the registry or model cannot be loaded, or the HTTP server fails to
/// bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env().map_err(startup_error)?;
    let FireWatch { state, engine } =
        FireWatch::from_config(&config).map_err(startup_error)?;

    let state = web::Data::new(state);
    let static_dir = config.static_dir.clone();

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            // Serve dashboard static files (production)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let broadcast_loop = supervisor::supervise(engine, shutdown_rx);

    let result = server.await;

    log::info!("Server stopped, shutting down broadcast loop...");
    let _ = shutdown_tx.send(true);
    if let Err(e) = broadcast_loop.await {
        log::error!("Broadcast loop ended abnormally: {e}");
    }

    result
}

fn startup_error(e: impl Into<ServerError>) -> std::io::Error {
    let e = e.into();
    log::error!("Startup failed: {e}");
    std::io::Error::other(e)
}
