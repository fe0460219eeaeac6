//! Record types flowing through the import pipeline
//!
//! A batch arrives as untyped [`RawRecord`]s (one JSON object per CSV
//! row), becomes [`ValidatedRecord`]s after schema validation, and
//! [`EnrichedRecord`]s once scoring results are merged in. Only the
//! schema validator can construct a `ValidatedRecord`, so untyped data
//! never flows past that boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One imported row, exactly as parsed from the upload: column name to
/// untyped scalar, no type guarantees.
pub type RawRecord = Map<String, Value>;

/// Which entity a batch targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Employee,
    PulseSurvey,
}

impl EntityKind {
    /// Short label for logs and messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employee",
            EntityKind::PulseSurvey => "survey",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A record that has passed schema validation.
///
/// Field values are coerced to their semantic types: integers and
/// decimals are JSON numbers, booleans are 0/1, enum tags are
/// normalized strings. The natural key and display name are extracted
/// for correlation.
#[derive(Debug, Clone)]
pub struct ValidatedRecord {
    key: i64,
    display_name: String,
    fields: Map<String, Value>,
}

impl ValidatedRecord {
    /// Only the schema validator constructs validated records.
    pub(crate) fn new(key: i64, display_name: String, fields: Map<String, Value>) -> Self {
        Self {
            key,
            display_name,
            fields,
        }
    }

    /// Natural key (`Employee ID`)
    pub fn key(&self) -> i64 {
        self.key
    }

    /// Display name (`Full Name`), used as the fallback correlation key
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Coerced column values, keyed by import column name
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// One feature's contribution to a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub feature: String,
    pub contribution: f64,
}

/// A validated record with its matched scoring result merged in.
///
/// Every validated record produces exactly one enriched record; rows
/// the scoring service skipped carry the neutral defaults and
/// `matched == false`.
#[derive(Debug, Clone)]
pub struct EnrichedRecord {
    pub record: ValidatedRecord,
    /// Attrition probability in [0, 1]; 0.5 when unmatched
    pub probability: f64,
    /// Attrition label (0/1), derived from probability when the service
    /// omits it
    pub label: i64,
    pub top_positive: Vec<Contributor>,
    pub top_negative: Vec<Contributor>,
    /// Whether the scoring response contained this record's key
    pub matched: bool,
}
