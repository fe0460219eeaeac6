//! Batch result envelope
//!
//! The external contract of one pipeline invocation: created once,
//! returned to the caller, never mutated and never persisted.

use serde::Serialize;
use uuid::Uuid;

use super::record::EntityKind;

/// One row-level validation failure (1-based row number, matching the
/// row numbering shown to the person who uploaded the file)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Pipeline stage names, reported on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    Validating,
    CheckingConflicts,
    Scoring,
    Merging,
    Persisting,
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImportStage::Validating => "validating",
            ImportStage::CheckingConflicts => "checking_conflicts",
            ImportStage::Scoring => "scoring",
            ImportStage::Merging => "merging",
            ImportStage::Persisting => "persisting",
        };
        f.write_str(name)
    }
}

/// What the upsert did for one natural key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Inserted,
    Updated,
}

/// Per-key upsert result, including the row as persisted
#[derive(Debug, Clone, Serialize)]
pub struct UpsertOutcome {
    pub employee_id: i64,
    pub action: UpsertAction,
    pub row: serde_json::Value,
}

/// Result envelope for one import batch
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub batch_id: Uuid,
    pub success: bool,
    pub message: String,
    /// Rows successfully processed (0 on failure)
    pub total: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RowError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<ImportStage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outcomes: Vec<UpsertOutcome>,
}

impl ImportReport {
    /// Successful batch result
    pub fn success(batch_id: Uuid, kind: EntityKind, outcomes: Vec<UpsertOutcome>) -> Self {
        let message = match kind {
            EntityKind::Employee => format!(
                "Successfully processed {} employee(s). Existing employees were updated.",
                outcomes.len()
            ),
            EntityKind::PulseSurvey => format!(
                "Successfully processed {} survey(s). Existing surveys were updated.",
                outcomes.len()
            ),
        };

        Self {
            batch_id,
            success: true,
            message,
            total: outcomes.len(),
            errors: Vec::new(),
            failed_stage: None,
            outcomes,
        }
    }

    /// Failed batch result
    pub fn failure(
        batch_id: Uuid,
        stage: ImportStage,
        message: String,
        errors: Vec<RowError>,
    ) -> Self {
        Self {
            batch_id,
            success: false,
            message,
            total: 0,
            errors,
            failed_stage: Some(stage),
            outcomes: Vec::new(),
        }
    }

    /// HTTP status for this result, by failure stage
    pub fn http_status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self.failed_stage {
            None => StatusCode::OK,
            Some(ImportStage::Validating) => StatusCode::BAD_REQUEST,
            Some(ImportStage::CheckingConflicts) => StatusCode::CONFLICT,
            Some(ImportStage::Scoring) => StatusCode::BAD_GATEWAY,
            Some(ImportStage::Merging) | Some(ImportStage::Persisting) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
