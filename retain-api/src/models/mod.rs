//! Data types for the import pipeline

pub mod record;
pub mod report;
pub mod schema;

pub use record::{Contributor, EnrichedRecord, EntityKind, RawRecord, ValidatedRecord};
pub use report::{ImportReport, ImportStage, RowError, UpsertAction, UpsertOutcome};
pub use schema::{schema_for, FieldRule, Schema, ValueRule};
