//! Bulk import endpoints
//!
//! Each endpoint accepts a JSON array of row objects (the parsed CSV)
//! and runs it through the import pipeline. The response body is the
//! batch result envelope; the HTTP status follows the failed stage,
//! 200 on success.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::models::{EntityKind, RawRecord};
use crate::AppState;

/// POST /api/employees/import
pub async fn import_employees(
    State(state): State<AppState>,
    Json(batch): Json<Vec<RawRecord>>,
) -> Response {
    let report = state.pipeline.run(EntityKind::Employee, &batch).await;
    (report.http_status(), Json(report)).into_response()
}

/// POST /api/pulse-surveys/import
pub async fn import_surveys(
    State(state): State<AppState>,
    Json(batch): Json<Vec<RawRecord>>,
) -> Response {
    let report = state.pipeline.run(EntityKind::PulseSurvey, &batch).await;
    (report.http_status(), Json(report)).into_response()
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/api/employees/import", post(import_employees))
        .route("/api/pulse-surveys/import", post(import_surveys))
}
