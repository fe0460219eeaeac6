//! retain-api - HR record ingest service
//!
//! Accepts bulk employee and pulse-survey uploads, validates and scores
//! them against the external attrition model, and persists the results.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use retain_api::config::{ApiConfig, Args};
use retain_api::services::{HttpScoringClient, ImportSettings};
use retain_api::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting retain-api");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = ApiConfig::resolve(Args::parse())?;
    info!("Database: {}", config.database_path.display());
    info!("Scoring service: {}", config.scoring_base_url);

    let db = retain_common::db::init_database(&config.database_path).await?;

    let scoring = Arc::new(HttpScoringClient::new(
        &config.scoring_base_url,
        config.scoring_timeout,
    ));
    let settings = ImportSettings {
        conflict_policy: config.conflict_policy,
        max_row_errors: config.max_row_errors,
    };

    let state = AppState::new(db, scoring, settings);
    let app = retain_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port)).await?;
    info!("Listening on http://127.0.0.1:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
