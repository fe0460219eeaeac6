//! Import pipeline services
//!
//! One module per pipeline stage, sequenced by the orchestrator:
//! schema validation, conflict checking, scoring, prediction merge.

pub mod conflict_checker;
pub mod import_orchestrator;
pub mod prediction_merger;
pub mod schema_validator;
pub mod scoring_client;

pub use conflict_checker::{ConflictDirection, ConflictPolicy};
pub use import_orchestrator::{ImportPipeline, ImportSettings};
pub use scoring_client::{HttpScoringClient, Prediction, ScoringClient, ScoringError};
