//! Threat Detector
//!
//! Upload a CSV, flag anomalous rows with an isolation forest and download
//! the annotated table. Also serves a short cybersecurity awareness quiz.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     THREAT DETECTOR                      │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌────────────┐   ┌───────────────────┐  │
//! │  │  API      │──▶│  Pipeline  │──▶│  Isolation Forest │  │
//! │  │  (Axum)   │   │  CSV/feat. │   │  (per request)    │  │
//! │  └─────┬─────┘   └─────┬──────┘   └───────────────────┘  │
//! │        │               ▼                                 │
//! │        │         ┌────────────┐                          │
//! │        │         │  Report    │  counters, chart, CSV    │
//! │        ▼         └────────────┘                          │
//! │  ┌───────────┐                                           │
//! │  │  Quiz     │  static questions                         │
//! │  └───────────┘                                           │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dataset;
pub mod detection;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod quiz;
pub mod report;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{Config, DetectionSettings, Profile};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Settings for the requested profile, or the configured default
    pub fn resolve(&self, profile: Option<Profile>) -> AppResult<(Profile, DetectionSettings)> {
        let profile = profile.unwrap_or(self.config.default_profile);
        let settings = self.config.settings_for(profile)?;
        Ok((profile, settings))
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let detection_routes = Router::new()
        .route("/api/v1/profiles", get(handlers::detection::profiles))
        .route("/api/v1/datasets/inspect", post(handlers::detection::inspect))
        .route("/api/v1/detect", post(handlers::detection::detect))
        .route("/api/v1/detect/report", post(handlers::detection::download_report))
        .route("/api/v1/detect/chart", post(handlers::detection::chart))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    let quiz_routes = Router::new()
        .route("/api/v1/quiz", get(handlers::quiz::list))
        .route("/api/v1/quiz/answer", post(handlers::quiz::answer))
        .route("/api/v1/quiz/submit", post(handlers::quiz::submit));

    let public_routes = Router::new()
        .route("/", get(handlers::dashboard::index))
        .route("/health", get(handlers::health::check))
        .route("/api/v1/about", get(handlers::about::about));

    Router::new()
        .merge(public_routes)
        .merge(detection_routes)
        .merge(quiz_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
