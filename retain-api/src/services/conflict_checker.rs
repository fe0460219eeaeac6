//! Batch conflict checking
//!
//! After validation, every natural key in the batch is checked against
//! the employees table in a single lookup. Employee imports must not
//! collide with existing rows; survey imports must reference rows that
//! already exist. The lookup and the later upsert are separate
//! transactions, so a concurrent writer can still slip between them;
//! the upsert's ON CONFLICT clause keeps that race from corrupting data.

use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::warn;

use crate::db;
use crate::error::ImportError;
use crate::models::{EntityKind, ValidatedRecord};

/// Which way the existence check cuts for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDirection {
    /// Keys must be absent from the store (employee imports)
    MustNotExist,
    /// Keys must already be present (survey imports)
    MustExist,
}

impl ConflictDirection {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Employee => ConflictDirection::MustNotExist,
            EntityKind::PulseSurvey => ConflictDirection::MustExist,
        }
    }
}

/// What to do when an employee batch collides with existing rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Abort the batch and report the colliding keys
    #[default]
    Reject,
    /// Let the batch proceed; colliding keys become updates
    Advisory,
}

impl std::str::FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(ConflictPolicy::Reject),
            "advisory" => Ok(ConflictPolicy::Advisory),
            other => Err(format!(
                "unknown conflict policy '{}' (expected 'reject' or 'advisory')",
                other
            )),
        }
    }
}

/// Check the batch's keys against the employees table.
///
/// Missing survey parents reject regardless of policy: the foreign key
/// would fail the upsert anyway. A failed lookup is logged and skipped
/// instead of failing the batch; the upsert's own conflict handling
/// still applies.
pub async fn check(
    db: &SqlitePool,
    kind: EntityKind,
    policy: ConflictPolicy,
    records: &[ValidatedRecord],
) -> Result<(), ImportError> {
    let keys: Vec<i64> = records.iter().map(|r| r.key()).collect();
    let existing: HashSet<i64> = match db::employees::existing_ids(db, &keys).await {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            warn!(error = %e, "existing-key lookup failed, skipping conflict check");
            return Ok(());
        }
    };

    match ConflictDirection::for_kind(kind) {
        ConflictDirection::MustNotExist => {
            let collisions: Vec<i64> = keys
                .iter()
                .copied()
                .filter(|k| existing.contains(k))
                .collect();
            if collisions.is_empty() {
                return Ok(());
            }
            match policy {
                ConflictPolicy::Reject => Err(ImportError::ExistingKeys(collisions)),
                ConflictPolicy::Advisory => {
                    warn!(
                        conflicts = collisions.len(),
                        "existing employee IDs in batch, proceeding as updates"
                    );
                    Ok(())
                }
            }
        }
        ConflictDirection::MustExist => {
            let missing: Vec<i64> = keys
                .iter()
                .copied()
                .filter(|k| !existing.contains(k))
                .collect();
            if missing.is_empty() {
                Ok(())
            } else {
                Err(ImportError::MissingParents(missing))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_follows_entity_kind() {
        assert_eq!(
            ConflictDirection::for_kind(EntityKind::Employee),
            ConflictDirection::MustNotExist
        );
        assert_eq!(
            ConflictDirection::for_kind(EntityKind::PulseSurvey),
            ConflictDirection::MustExist
        );
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Reject".parse::<ConflictPolicy>(), Ok(ConflictPolicy::Reject));
        assert_eq!(
            "ADVISORY".parse::<ConflictPolicy>(),
            Ok(ConflictPolicy::Advisory)
        );
        assert!("soft".parse::<ConflictPolicy>().is_err());
    }
}
