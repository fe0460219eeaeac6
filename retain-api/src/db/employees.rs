//! Employee table operations
//!
//! The import path needs two things here: the existing-key lookup the
//! conflict checker runs, and the transactional bulk upsert. The upsert
//! keys on `employee_id`; a conflicting row has every data column
//! overwritten from the incoming record, so a re-imported file
//! converges on the file's contents.

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
    ("Age", "age"),
    ("Gender", "gender"),
    ("Years of experience", "years_of_experience"),
    ("Job Role", "job_role"),
    ("Salary", "salary"),
    ("Performance Rating", "performance_rating"),
    ("Number of Promotions", "number_of_promotions"),
    ("Overtime", "overtime"),
    ("Commuting distance", "commuting_distance"),
    ("Education Level", "education_level"),
    ("Marital Status", "marital_status"),
    ("Number of Dependents", "number_of_dependents"),
    ("Job Level", "job_level"),
    ("Last hike", "last_hike"),
    ("Years in current role", "years_in_current_role"),
    ("Working model", "working_model"),
    ("Working hours", "working_hours"),
    ("Department", "department"),
    ("No. of companies worked previously", "no_of_companies_worked_previously"),
    ("LeavesTaken", "leaves_taken"),
    ("YearsWithCompany", "years_with_company"),
];

const OUTCOME_COLUMNS: &[&str] = &[
    "attrition_score",
    "attrition",
    "top_positive_contributors",
    "top_negative_contributors",
];

/// Which of the given employee IDs already exist
pub async fn existing_ids(pool: &SqlitePool, keys: &[i64]) -> sqlx::Result<Vec<i64>> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::new("SELECT employee_id FROM employees WHERE employee_id IN (");
    let mut sep = qb.separated(", ");
    for key in keys {
        sep.push_bind(*key);
    }
    qb.push(")");

    qb.build_query_scalar().fetch_all(pool).await
}

/// Upsert a scored batch in one transaction.
///
/// Returns one outcome per record, in input order, with the row as it
/// reads back after the commit.
pub async fn upsert_batch(
    pool: &SqlitePool,
    batch: &[EnrichedRecord],
) -> sqlx::Result<Vec<UpsertOutcome>> {
    if batch.is_empty() {
        return Ok(Vec::new());
    }

    let keys: Vec<i64> = batch.iter().map(|e| e.record.key()).collect();
    let mut tx = pool.begin().await?;

    // Which keys existed before the write decides inserted vs updated
    let mut pre_qb =
        QueryBuilder::new("SELECT employee_id FROM employees WHERE employee_id IN (");
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

    let mut qb = QueryBuilder::new("INSERT INTO employees (");
    let mut col_sep = qb.separated(", ");
    for (_, column) in COLUMNS {
        col_sep.push(*column);
    }
    for column in OUTCOME_COLUMNS {
        col_sep.push(*column);
    }
    qb.push(") ");

    qb.push_values(batch, |mut b, rec| {
        for (header, _) in COLUMNS {
            bind_field(&mut b, rec.record.fields().get(*header));
        }
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
    for column in OUTCOME_COLUMNS {
        set_sep.push(format!("{column} = excluded.{column}"));
    }
    set_sep.push("updated_at = CURRENT_TIMESTAMP");

    qb.build().execute(&mut *tx).await?;

    // Read the rows back as persisted, inside the same transaction
    let mut read_qb = QueryBuilder::new("SELECT * FROM employees WHERE employee_id IN (");
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

    debug!(rows = batch.len(), "employee batch upserted");

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
    Ok(json!({
        "employee_id": row.try_get::<i64, _>("employee_id")?,
        "full_name": row.try_get::<String, _>("full_name")?,
        "age": row.try_get::<Option<i64>, _>("age")?,
        "gender": row.try_get::<Option<String>, _>("gender")?,
        "years_of_experience": row.try_get::<Option<f64>, _>("years_of_experience")?,
        "job_role": row.try_get::<Option<String>, _>("job_role")?,
        "salary": row.try_get::<Option<f64>, _>("salary")?,
        "performance_rating": row.try_get::<Option<i64>, _>("performance_rating")?,
        "number_of_promotions": row.try_get::<Option<i64>, _>("number_of_promotions")?,
        "overtime": row.try_get::<Option<i64>, _>("overtime")?,
        "commuting_distance": row.try_get::<Option<f64>, _>("commuting_distance")?,
        "education_level": row.try_get::<Option<String>, _>("education_level")?,
        "marital_status": row.try_get::<Option<String>, _>("marital_status")?,
        "number_of_dependents": row.try_get::<Option<i64>, _>("number_of_dependents")?,
        "job_level": row.try_get::<Option<i64>, _>("job_level")?,
        "last_hike": row.try_get::<Option<f64>, _>("last_hike")?,
        "years_in_current_role": row.try_get::<Option<f64>, _>("years_in_current_role")?,
        "working_model": row.try_get::<Option<String>, _>("working_model")?,
        "working_hours": row.try_get::<Option<f64>, _>("working_hours")?,
        "department": row.try_get::<Option<String>, _>("department")?,
        "no_of_companies_worked_previously":
            row.try_get::<Option<i64>, _>("no_of_companies_worked_previously")?,
        "leaves_taken": row.try_get::<Option<i64>, _>("leaves_taken")?,
        "years_with_company": row.try_get::<Option<f64>, _>("years_with_company")?,
        "attrition_score": row.try_get::<Option<f64>, _>("attrition_score")?,
        "attrition": row.try_get::<Option<i64>, _>("attrition")?,
        "top_positive_contributors":
            parse_json_text(row.try_get::<Option<String>, _>("top_positive_contributors")?),
        "top_negative_contributors":
            parse_json_text(row.try_get::<Option<String>, _>("top_negative_contributors")?),
        "created_at": row.try_get::<String, _>("created_at")?,
        "updated_at": row.try_get::<String, _>("updated_at")?,
    }))
}
