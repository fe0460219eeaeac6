//! Import pipeline orchestration
//!
//! Runs the fixed stage sequence for one batch: validate, check
//! conflicts, score, merge, persist. The first failing stage aborts the
//! batch; nothing is written unless every stage succeeds. Infallible by
//! construction: every outcome, success or failure, becomes an
//! [`ImportReport`].

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::error::{ImportError, DEFAULT_ROW_ERROR_CAP};
use crate::models::{schema_for, EntityKind, ImportReport, RawRecord, UpsertOutcome};
use crate::services::{conflict_checker, prediction_merger, schema_validator};
use crate::services::{ConflictPolicy, ScoringClient};

/// Tunables for the import pipeline
#[derive(Debug, Clone, Copy)]
pub struct ImportSettings {
    pub conflict_policy: ConflictPolicy,
    /// Row errors shown in the failure message; the structured error
    /// list is never truncated
    pub max_row_errors: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::default(),
            max_row_errors: DEFAULT_ROW_ERROR_CAP,
        }
    }
}

/// The import pipeline: shared by both entity kinds, dispatching on
/// [`EntityKind`] per batch.
pub struct ImportPipeline {
    db: SqlitePool,
    scoring: Arc<dyn ScoringClient>,
    settings: ImportSettings,
}

impl ImportPipeline {
    pub fn new(db: SqlitePool, scoring: Arc<dyn ScoringClient>, settings: ImportSettings) -> Self {
        Self {
            db,
            scoring,
            settings,
        }
    }

    /// Run one batch through the pipeline.
    pub async fn run(&self, kind: EntityKind, batch: &[RawRecord]) -> ImportReport {
        let batch_id = Uuid::new_v4();
        info!(%batch_id, kind = %kind, rows = batch.len(), "import batch received");

        match self.execute(kind, batch).await {
            Ok(outcomes) => {
                info!(%batch_id, processed = outcomes.len(), "import batch committed");
                ImportReport::success(batch_id, kind, outcomes)
            }
            Err(e) => {
                warn!(%batch_id, stage = %e.stage(), error = %e, "import batch failed");
                ImportReport::failure(
                    batch_id,
                    e.stage(),
                    e.message(self.settings.max_row_errors),
                    e.row_errors(),
                )
            }
        }
    }

    async fn execute(
        &self,
        kind: EntityKind,
        batch: &[RawRecord],
    ) -> Result<Vec<UpsertOutcome>, ImportError> {
        let records = schema_validator::validate(batch, schema_for(kind))?;

        conflict_checker::check(&self.db, kind, self.settings.conflict_policy, &records).await?;

        let predictions = self
            .scoring
            .score_batch(kind, &records)
            .await
            .map_err(ImportError::Scoring)?;

        let enriched = prediction_merger::merge(records, predictions);

        let outcomes = match kind {
            EntityKind::Employee => db::employees::upsert_batch(&self.db, &enriched).await,
            EntityKind::PulseSurvey => db::surveys::upsert_batch(&self.db, &enriched).await,
        }
        .map_err(ImportError::Persist)?;

        Ok(outcomes)
    }
}
