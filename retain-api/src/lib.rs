//! retain-api library interface
//!
//! Exposes the import pipeline and HTTP surface for integration
//! testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::{ImportPipeline, ImportSettings, ScoringClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// The import pipeline, shared by both import endpoints
    pub pipeline: Arc<ImportPipeline>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, scoring: Arc<dyn ScoringClient>, settings: ImportSettings) -> Self {
        let pipeline = Arc::new(ImportPipeline::new(db.clone(), scoring, settings));
        Self {
            db,
            pipeline,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::import_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
