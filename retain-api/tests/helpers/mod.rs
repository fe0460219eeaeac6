//! Shared test helpers: in-memory app state, a fake scoring service,
//! and batch builders.

// Not every test binary uses every helper
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use retain_api::models::{Contributor, EntityKind, RawRecord, ValidatedRecord};
use retain_api::services::{
    ConflictPolicy, ImportSettings, Prediction, ScoringClient, ScoringError,
};
use retain_api::AppState;
use retain_common::db::init_memory_database;

/// Scripted stand-in for the attrition scoring service.
#[derive(Default)]
pub struct FakeScoringClient {
    calls: AtomicUsize,
    /// Keys left out of the response, as if the model skipped them
    skip_keys: Vec<i64>,
    /// When set, every call fails with an API error
    fail: bool,
    probability: f64,
}

impl FakeScoringClient {
    pub fn new() -> Self {
        Self {
            probability: 0.8,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn skipping(keys: Vec<i64>) -> Self {
        Self {
            skip_keys: keys,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringClient for FakeScoringClient {
    async fn score_batch(
        &self,
        _kind: EntityKind,
        records: &[ValidatedRecord],
    ) -> Result<Vec<Prediction>, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(ScoringError::Api {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "model unavailable".to_string(),
            });
        }

        Ok(records
            .iter()
            .filter(|r| !self.skip_keys.contains(&r.key()))
            .map(|r| Prediction {
                employee_id: Some(r.key()),
                full_name: Some(r.display_name().to_string()),
                attrition_probability: Some(self.probability),
                attrition: None,
                top_positive_contributors: vec![Contributor {
                    feature: "Salary".to_string(),
                    contribution: 0.2,
                }],
                top_negative_contributors: Vec::new(),
            })
            .collect())
    }
}

/// In-memory app state wired to the given fake scoring client.
pub async fn test_state(scoring: Arc<FakeScoringClient>, policy: ConflictPolicy) -> AppState {
    let db = init_memory_database().await.unwrap();
    let settings = ImportSettings {
        conflict_policy: policy,
        ..ImportSettings::default()
    };
    AppState::new(db, scoring, settings)
}

/// A complete, valid employee row
pub fn employee_row(id: i64, name: &str) -> RawRecord {
    json!({
        "Employee ID": id,
        "Full Name": name,
        "Age": 34,
        "Gender": "F",
        "Years of experience": 10,
        "Job Role": "Engineer",
        "Salary": 85000,
        "Performance Rating": 4,
        "Number of Promotions": 2,
        "Overtime": "No",
        "Commuting distance": 12.5,
        "Education Level": "Graduate",
        "Marital Status": "Married",
        "Number of Dependents": 1,
        "Job Level": 3,
        "Last hike": 8,
        "Years in current role": 2,
        "Working model": "Hybrid",
        "Working hours": 40,
        "Department": "Engineering",
        "No. of companies worked previously": 2,
        "LeavesTaken": 11,
        "YearsWithCompany": 4
    })
    .as_object()
    .unwrap()
    .clone()
}

/// A complete, valid pulse-survey row (all ratings = 3)
pub fn survey_row(id: i64, name: &str) -> RawRecord {
    let mut row = RawRecord::new();
    row.insert("Employee ID".into(), json!(id));
    row.insert("Full Name".into(), json!(name));
    for column in [
        "Work-Life Balance",
        "Job Satisfaction",
        "Relationship with Manager",
        "Communication effectiveness",
        "Recognition and Reward Satisfaction",
        "Career growth and advancement opportunities",
        "Alignment with Company Values/Mission",
        "Perceived fairness",
        "Team cohesion and peer support",
        "Autonomy at work",
        "Overall engagement",
        "Training and skill development satisfaction",
        "Stress levels/work pressure",
        "Organizational change readiness",
        "Feedback frequency and usefulness",
        "Flexibility support",
        "Conflict at work",
        "Perceived job security",
        "Environment satisfaction",
    ] {
        row.insert(column.to_string(), json!(3));
    }
    row
}
