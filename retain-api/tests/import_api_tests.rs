//! HTTP surface tests: routing, status mapping, and response bodies.

mod helpers;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use helpers::{employee_row, survey_row, test_state, FakeScoringClient};
use retain_api::services::ConflictPolicy;
use retain_api::{build_router, AppState};

async fn app(scoring: Arc<FakeScoringClient>) -> axum::Router {
    let state: AppState = test_state(scoring, ConflictPolicy::Reject).await;
    build_router(state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app(Arc::new(FakeScoringClient::new())).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["module"], json!("retain-api"));
}

#[tokio::test]
async fn employee_import_returns_the_result_envelope() {
    let app = app(Arc::new(FakeScoringClient::new())).await;

    let batch = json!([employee_row(1, "Ada"), employee_row(2, "Grace")]);
    let response = app
        .oneshot(post_json("/api/employees/import", batch))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["total"], json!(2));
    assert!(body["batch_id"].is_string());
    assert_eq!(body["outcomes"].as_array().unwrap().len(), 2);
    assert_eq!(body["outcomes"][0]["action"], json!("inserted"));
    assert_eq!(
        body["message"],
        json!("Successfully processed 2 employee(s). Existing employees were updated.")
    );
}

#[tokio::test]
async fn validation_failure_maps_to_400() {
    let app = app(Arc::new(FakeScoringClient::new())).await;

    let mut row = employee_row(1, "Ada");
    row.remove("Salary");
    let response = app
        .oneshot(post_json("/api/employees/import", json!([row])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["failed_stage"], json!("validating"));
    assert!(body["message"].as_str().unwrap().contains("Salary"));
}

#[tokio::test]
async fn survey_without_parent_maps_to_409() {
    let app = app(Arc::new(FakeScoringClient::new())).await;

    let response = app
        .oneshot(post_json(
            "/api/pulse-surveys/import",
            json!([survey_row(7, "Nobody")]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["failed_stage"], json!("checking_conflicts"));
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("not found in database: 7"));
}

#[tokio::test]
async fn scoring_failure_maps_to_502() {
    let app = app(Arc::new(FakeScoringClient::failing())).await;

    let response = app
        .oneshot(post_json(
            "/api/employees/import",
            json!([employee_row(1, "Ada")]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["failed_stage"], json!("scoring"));
}
