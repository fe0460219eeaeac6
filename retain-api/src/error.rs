//! Error types for retain-api
//!
//! [`ImportError`] is the pipeline's batch-fatal error taxonomy: every
//! variant aborts the whole batch, no partial success. Each variant
//! knows its pipeline stage and renders the user-facing message.

use crate::models::{ImportStage, RowError};
use crate::services::scoring_client::ScoringError;

/// Row-error cap used when no explicit display limit is configured
pub const DEFAULT_ROW_ERROR_CAP: usize = 10;

/// Batch-fatal import pipeline errors
#[derive(Debug)]
pub enum ImportError {
    /// Empty batch or missing required columns; fails before any row is
    /// inspected
    Structural(String),
    /// Row-level field violations and/or within-batch duplicate keys,
    /// collected exhaustively before failing
    Validation {
        row_errors: Vec<RowError>,
        duplicate_keys: Vec<i64>,
    },
    /// Employee import keys already present in the store
    ExistingKeys(Vec<i64>),
    /// Survey import keys with no matching employee
    MissingParents(Vec<i64>),
    /// The scoring service call failed, timed out, or returned an error
    Scoring(ScoringError),
    /// The bulk upsert failed; the whole batch was rolled back
    Persist(sqlx::Error),
}

impl ImportError {
    /// Pipeline stage this error belongs to
    pub fn stage(&self) -> ImportStage {
        match self {
            ImportError::Structural(_) | ImportError::Validation { .. } => ImportStage::Validating,
            ImportError::ExistingKeys(_) | ImportError::MissingParents(_) => {
                ImportStage::CheckingConflicts
            }
            ImportError::Scoring(_) => ImportStage::Scoring,
            ImportError::Persist(_) => ImportStage::Persisting,
        }
    }

    /// Structured row errors, for the result envelope (full list; the
    /// cap only applies to the message text)
    pub fn row_errors(&self) -> Vec<RowError> {
        match self {
            ImportError::Validation { row_errors, .. } => row_errors.clone(),
            _ => Vec::new(),
        }
    }

    /// Human-readable message, with row errors capped at `cap` entries
    /// plus a count of the remainder
    pub fn message(&self, cap: usize) -> String {
        match self {
            ImportError::Structural(msg) => msg.clone(),
            ImportError::Validation {
                row_errors,
                duplicate_keys,
            } => {
                let mut parts = Vec::new();
                if !duplicate_keys.is_empty() {
                    parts.push(format!(
                        "Duplicate Employee IDs found in CSV: {}",
                        join_keys(duplicate_keys)
                    ));
                }
                if !row_errors.is_empty() {
                    let shown: Vec<String> = row_errors
                        .iter()
                        .take(cap)
                        .map(|e| format!("Row {}: {}", e.row, e.message))
                        .collect();
                    let mut text = format!("Validation errors found:\n{}", shown.join("\n"));
                    if row_errors.len() > cap {
                        text.push_str(&format!(
                            "\n... and {} more errors",
                            row_errors.len() - cap
                        ));
                    }
                    parts.push(text);
                }
                parts.join("\n")
            }
            ImportError::ExistingKeys(keys) => format!(
                "Employee IDs already exist in database: {}. Please remove these records or update their IDs.",
                join_keys(keys)
            ),
            ImportError::MissingParents(keys) => format!(
                "Employee IDs not found in database: {}. Please ensure all employees exist before uploading surveys.",
                join_keys(keys)
            ),
            ImportError::Scoring(e) => format!("Prediction failed: {}", e),
            ImportError::Persist(e) => format!("Bulk upsert failed: {}", e),
        }
    }
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message(DEFAULT_ROW_ERROR_CAP))
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Persist(e) => Some(e),
            ImportError::Scoring(e) => Some(e),
            _ => None,
        }
    }
}

fn join_keys(keys: &[i64]) -> String {
    keys.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
