//! siteform-audit library interface for testing
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod controller;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use siteform_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use crate::controller::SessionController;

/// Default port for siteform-audit
pub const DEFAULT_PORT: u16 = 5780;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// The one audit session this service hosts
    pub controller: Arc<RwLock<SessionController>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, event_bus: EventBus) -> Self {
        Self {
            db,
            event_bus,
            controller: Arc::new(RwLock::new(SessionController::new())),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::catalog_routes())
        .merge(api::session_routes())
        .merge(api::answer_routes())
        .merge(api::submission_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .with_state(state)
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}
