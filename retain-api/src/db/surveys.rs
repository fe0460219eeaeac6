//! Pulse survey table operations
//!
//! One survey row per employee: the upsert keys on the UNIQUE
//! `employee_id`, so re-submitting a survey file replaces the previous
//! responses and stamps a fresh survey date. The foreign key to
//! employees means the conflict checker must have verified parents
//! before this runs.

use serde_json::{json, Value};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, SqlitePool};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::{bind_field, parse_json_text};
use crate::models::{EnrichedRecord, UpsertAction, UpsertOutcome};

/// Import column name to table column, in table column order
const COLUMNS: &[(&str, &str)] = &[
    ("Employee ID", "employee_id"),
    ("Full Name", "full_name"),
    ("Work-Life Balance", "work_life_balance"),
    ("Job Satisfaction", "job_satisfaction"),
    ("Relationship with Manager", "relationship_with_manager"),
    ("Communication effectiveness", "communication_effectiveness"),
    ("Recognition and Reward Satisfaction", "recognition_reward_sat"),
    ("Career growth and advancement opportunities", "career_growth_opportunities"),
    ("Alignment with Company Values/Mission", "alignment_with_company_values"),
    ("Perceived fairness", "perceived_fairness"),
    ("Team cohesion and peer support", "team_cohesion_support"),
    ("Autonomy at work", "autonomy_at_work"),
    ("Overall engagement", "overall_engagement"),
    ("Training and skill development satisfaction", "training_skill_dev_sat"),
    ("Stress levels/work pressure", "stress_levels"),
    ("Organizational change readiness", "org_change_readiness"),
    ("Feedback frequency and usefulness", "feedback_usefulness"),
    ("Flexibility support", "flexibility_support"),
    ("Conflict at work", "conflict_at_work"),
    ("Perceived job security", "perceived_job_security"),
    ("Environment satisfaction", "environment_satisfaction"),
];

const OUTCOME_COLUMNS: &[&str] = &[
    "attrition_score",
    "attrition",
    "top_positive_contributors",
    "top_negative_contributors",
];

/// Upsert a scored survey batch in one transaction.
pub async fn upsert_batch(
    pool: &SqlitePool,
    batch: &[EnrichedRecord],
) -> sqlx::Result<Vec<UpsertOutcome>> {
    if batch.is_empty() {
        return Ok(Vec::new());
    }

    let keys: Vec<i64> = batch.iter().map(|e| e.record.key()).collect();
    let mut tx = pool.begin().await?;

    let mut pre_qb =
        QueryBuilder::new("SELECT employee_id FROM pulse_surveys WHERE employee_id IN (");
    let mut sep = pre_qb.separated(", ");
    for key in &keys {
        sep.push_bind(*key);
    }
    pre_qb.push(")");
    let pre_existing: HashSet<i64> = pre_qb
        .build_query_scalar::<i64>()
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

    let mut qb = QueryBuilder::new("INSERT INTO pulse_surveys (");
    let mut col_sep = qb.separated(", ");
    for (_, column) in COLUMNS {
        col_sep.push(*column);
    }
    col_sep.push("survey_date");
    for column in OUTCOME_COLUMNS {
        col_sep.push(*column);
    }
    qb.push(") ");

    qb.push_values(batch, |mut b, rec| {
        for (header, _) in COLUMNS {
            bind_field(&mut b, rec.record.fields().get(*header));
        }
        // Survey date is stamped at persist time, not taken from the file
        b.push("CURRENT_DATE");
        b.push_bind(rec.probability);
        b.push_bind(rec.label);
        b.push_bind(sqlx::types::Json(&rec.top_positive));
        b.push_bind(sqlx::types::Json(&rec.top_negative));
    });

    qb.push(" ON CONFLICT(employee_id) DO UPDATE SET ");
    let mut set_sep = qb.separated(", ");
    for (_, column) in COLUMNS.iter().skip(1) {
        set_sep.push(format!("{column} = excluded.{column}"));
    }
    set_sep.push("survey_date = excluded.survey_date");
    for column in OUTCOME_COLUMNS {
        set_sep.push(format!("{column} = excluded.{column}"));
    }
    set_sep.push("updated_at = CURRENT_TIMESTAMP");

    qb.build().execute(&mut *tx).await?;

    let mut read_qb = QueryBuilder::new("SELECT * FROM pulse_surveys WHERE employee_id IN (");
    let mut sep = read_qb.separated(", ");
    for key in &keys {
        sep.push_bind(*key);
    }
    read_qb.push(")");
    let rows = read_qb.build().fetch_all(&mut *tx).await?;

    tx.commit().await?;

    let mut by_key: HashMap<i64, Value> = HashMap::with_capacity(rows.len());
    for row in &rows {
        by_key.insert(row.try_get("employee_id")?, row_json(row)?);
    }

    debug!(rows = batch.len(), "survey batch upserted");

    Ok(keys
        .iter()
        .map(|key| UpsertOutcome {
            employee_id: *key,
            action: if pre_existing.contains(key) {
                UpsertAction::Updated
            } else {
                UpsertAction::Inserted
            },
            row: by_key.remove(key).unwrap_or(Value::Null),
        })
        .collect())
}

fn row_json(row: &SqliteRow) -> sqlx::Result<Value> {
    let mut obj = serde_json::Map::new();
    obj.insert("survey_id".into(), json!(row.try_get::<i64, _>("survey_id")?));
    obj.insert(
        "employee_id".into(),
        json!(row.try_get::<i64, _>("employee_id")?),
    );
    obj.insert(
        "full_name".into(),
        json!(row.try_get::<Option<String>, _>("full_name")?),
    );
    for (_, column) in COLUMNS.iter().skip(2) {
        obj.insert(
            column.to_string(),
            json!(row.try_get::<Option<i64>, _>(*column)?),
        );
    }
    obj.insert(
        "survey_date".into(),
        json!(row.try_get::<Option<String>, _>("survey_date")?),
    );
    obj.insert(
        "attrition_score".into(),
        json!(row.try_get::<Option<f64>, _>("attrition_score")?),
    );
    obj.insert(
        "attrition".into(),
        json!(row.try_get::<Option<i64>, _>("attrition")?),
    );
    obj.insert(
        "top_positive_contributors".into(),
        parse_json_text(row.try_get::<Option<String>, _>("top_positive_contributors")?),
    );
    obj.insert(
        "top_negative_contributors".into(),
        parse_json_text(row.try_get::<Option<String>, _>("top_negative_contributors")?),
    );
    obj.insert(
        "created_at".into(),
        json!(row.try_get::<String, _>("created_at")?),
    );
    obj.insert(
        "updated_at".into(),
        json!(row.try_get::<String, _>("updated_at")?),
    );
    Ok(Value::Object(obj))
}
