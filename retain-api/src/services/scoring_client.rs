//! Scoring service client
//!
//! Sends validated batches to the external attrition-scoring service
//! and parses its predictions. Outcome columns are stripped from the
//! payload before sending so stale scores in a re-imported file never
//! reach the model.
//!
//! The trait seam exists so the pipeline can be tested against a fake
//! scoring service.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{Contributor, EntityKind, ValidatedRecord};

/// Outcome columns that must never be sent to the scoring service
const OUTCOME_COLUMNS: &[&str] = &[
    "attrition_score",
    "attrition",
    "attrition_probability",
    "top_positive_contributors",
    "top_negative_contributors",
];

/// Scoring service failures
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scoring service unreachable: {0}")]
    Network(reqwest::Error),

    #[error("scoring service timed out")]
    Timeout,

    #[error("scoring service returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("could not parse scoring response: {0}")]
    Parse(String),
}

/// One prediction from the scoring service.
///
/// The service echoes the correlation keys back using the import
/// column names; field aliases accept both spellings.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    #[serde(default, alias = "Employee ID")]
    pub employee_id: Option<i64>,
    #[serde(default, alias = "Full Name")]
    pub full_name: Option<String>,
    #[serde(default, alias = "probability")]
    pub attrition_probability: Option<f64>,
    #[serde(default)]
    pub attrition: Option<i64>,
    #[serde(default)]
    pub top_positive_contributors: Vec<Contributor>,
    #[serde(default)]
    pub top_negative_contributors: Vec<Contributor>,
}

/// Batch scoring seam
#[async_trait]
pub trait ScoringClient: Send + Sync {
    /// Score a validated batch. One call per batch; any failure is
    /// batch-fatal.
    async fn score_batch(
        &self,
        kind: EntityKind,
        records: &[ValidatedRecord],
    ) -> Result<Vec<Prediction>, ScoringError>;
}

/// HTTP client for the scoring service
pub struct HttpScoringClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScoringClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, kind: EntityKind) -> String {
        let path = match kind {
            EntityKind::Employee => "/predict_batch",
            EntityKind::PulseSurvey => "/survey_predict_batch",
        };
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ScoringClient for HttpScoringClient {
    async fn score_batch(
        &self,
        kind: EntityKind,
        records: &[ValidatedRecord],
    ) -> Result<Vec<Prediction>, ScoringError> {
        let url = self.endpoint(kind);
        let payload: Vec<Map<String, Value>> = records.iter().map(scoring_payload).collect();

        debug!(url = %url, rows = payload.len(), "sending batch to scoring service");

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScoringError::Timeout
                } else {
                    ScoringError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoringError::Api { status, body });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ScoringError::Parse(e.to_string()))?;
        parse_predictions(body)
    }
}

/// The scoring payload is the full validated row minus outcome columns
pub fn scoring_payload(record: &ValidatedRecord) -> Map<String, Value> {
    record
        .fields()
        .iter()
        .filter(|(col, _)| !OUTCOME_COLUMNS.contains(&col.as_str()))
        .map(|(col, value)| (col.clone(), value.clone()))
        .collect()
}

/// Accepts either a bare prediction array or a `{"predictions": [...]}`
/// envelope
fn parse_predictions(body: Value) -> Result<Vec<Prediction>, ScoringError> {
    let list = match body {
        Value::Object(mut obj) => obj
            .remove("predictions")
            .ok_or_else(|| ScoringError::Parse("missing 'predictions' field".to_string()))?,
        other => other,
    };
    serde_json::from_value(list).map_err(|e| ScoringError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_strips_outcome_columns() {
        let mut fields = Map::new();
        fields.insert("Employee ID".into(), json!(7));
        fields.insert("Age".into(), json!(40));
        fields.insert("attrition_score".into(), json!(0.9));
        fields.insert("top_positive_contributors".into(), json!([]));
        let record = ValidatedRecord::new(7, "Ada".into(), fields);

        let payload = scoring_payload(&record);
        assert!(payload.contains_key("Age"));
        assert!(!payload.contains_key("attrition_score"));
        assert!(!payload.contains_key("top_positive_contributors"));
    }

    #[test]
    fn parses_enveloped_and_bare_responses() {
        let enveloped = json!({"predictions": [{"Employee ID": 7, "attrition_probability": 0.8}]});
        let bare = json!([{"employee_id": 7, "probability": 0.8}]);

        for body in [enveloped, bare] {
            let predictions = parse_predictions(body).unwrap();
            assert_eq!(predictions.len(), 1);
            assert_eq!(predictions[0].employee_id, Some(7));
            assert_eq!(predictions[0].attrition_probability, Some(0.8));
        }
    }

    #[test]
    fn missing_predictions_field_is_a_parse_error() {
        let err = parse_predictions(json!({"results": []})).unwrap_err();
        assert!(matches!(err, ScoringError::Parse(_)));
    }
}
