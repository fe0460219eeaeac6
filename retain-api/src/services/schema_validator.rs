//! Schema validation for import batches
//!
//! Structural checks (empty batch, missing columns) fail the whole
//! batch before any row is inspected. Row-level checks never
//! short-circuit each other: every row is checked and every violation
//! recorded, so the caller gets the complete defect list in one pass.
//! Within-batch duplicate natural keys are collected alongside.

use serde_json::{Map, Value};

use crate::error::ImportError;
use crate::models::{RawRecord, RowError, Schema, ValidatedRecord, ValueRule};

/// Validate a raw batch against its schema.
///
/// On success every record comes back with coerced, type-correct values
/// and its natural key extracted. Any failure is batch-fatal.
pub fn validate(batch: &[RawRecord], schema: &Schema) -> Result<Vec<ValidatedRecord>, ImportError> {
    // Structural: non-empty batch
    if batch.is_empty() {
        return Err(ImportError::Structural(
            "CSV file is empty or invalid format".to_string(),
        ));
    }

    // Structural: the first row's column set must cover the schema
    let missing: Vec<&str> = schema
        .required_columns()
        .filter(|col| !batch[0].contains_key(*col))
        .collect();
    if !missing.is_empty() {
        let noun = match schema.entity {
            "survey" => "required survey columns",
            _ => "required columns",
        };
        return Err(ImportError::Structural(format!(
            "Missing required columns: {}. Please ensure your CSV has all {}.",
            missing.join(", "),
            noun
        )));
    }

    let mut row_errors: Vec<RowError> = Vec::new();
    let mut records: Vec<Option<ValidatedRecord>> = Vec::with_capacity(batch.len());
    let mut keys: Vec<Option<i64>> = Vec::with_capacity(batch.len());

    for (index, raw) in batch.iter().enumerate() {
        let row = index + 1;
        let before = row_errors.len();
        let mut fields: Map<String, Value> = Map::new();
        let mut key: Option<i64> = None;
        let mut name: Option<String> = None;

        for field in schema.fields {
            let value = raw.get(field.column).filter(|v| !is_absent(v));

            match field.rule {
                ValueRule::Key => match value.and_then(parse_i64) {
                    Some(k) => {
                        key = Some(k);
                        fields.insert(field.column.to_string(), Value::from(k));
                    }
                    None => row_errors.push(RowError {
                        row,
                        message: format!("{} must be a valid number", field.column),
                    }),
                },
                ValueRule::Name => match value.and_then(Value::as_str) {
                    Some(s) if !s.trim().is_empty() => {
                        name = Some(s.trim().to_string());
                        fields.insert(field.column.to_string(), Value::from(s.trim()));
                    }
                    _ => row_errors.push(RowError {
                        row,
                        message: format!(
                            "{} is required and must be a non-empty string",
                            field.column
                        ),
                    }),
                },
                _ => match value {
                    None => {
                        fields.insert(field.column.to_string(), Value::Null);
                    }
                    Some(v) => match coerce(field.rule, v) {
                        Ok(coerced) => {
                            fields.insert(field.column.to_string(), coerced);
                        }
                        Err(message) => row_errors.push(RowError {
                            row,
                            message: format!("{} {}", field.column, message),
                        }),
                    },
                },
            }
        }

        // Extra columns pass through untouched; the scoring payload
        // carries the full row just like the original upload did
        for (col, value) in raw {
            if !fields.contains_key(col) {
                fields.insert(col.clone(), value.clone());
            }
        }

        keys.push(key);
        if row_errors.len() == before {
            if let (Some(k), Some(n)) = (key, name) {
                records.push(Some(ValidatedRecord::new(k, n, fields)));
                continue;
            }
        }
        records.push(None);
    }

    // Within-batch duplicate natural keys: batch-level, each duplicated
    // value reported once, in first-occurrence order
    let mut seen: Vec<i64> = Vec::new();
    let mut duplicate_keys: Vec<i64> = Vec::new();
    for key in keys.iter().flatten() {
        if seen.contains(key) {
            if !duplicate_keys.contains(key) {
                duplicate_keys.push(*key);
            }
        } else {
            seen.push(*key);
        }
    }

    if !row_errors.is_empty() || !duplicate_keys.is_empty() {
        return Err(ImportError::Validation {
            row_errors,
            duplicate_keys,
        });
    }

    // No errors: every slot holds a record
    Ok(records.into_iter().flatten().collect())
}

/// Null and empty-string values count as absent
fn is_absent(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Coerce a present value against its rule. Error messages omit the
/// column name; the caller prefixes it.
fn coerce(rule: ValueRule, value: &Value) -> Result<Value, String> {
    match rule {
        ValueRule::Key | ValueRule::Name => unreachable!("handled by caller"),
        ValueRule::Int { min, max } => {
            let n = parse_i64(value).ok_or_else(|| bounds_message(min, max))?;
            if min.is_some_and(|m| n < m) || max.is_some_and(|m| n > m) {
                return Err(bounds_message(min, max));
            }
            Ok(Value::from(n))
        }
        ValueRule::Num { non_negative } => {
            let n = parse_f64(value).ok_or("must be a valid number")?;
            if non_negative && n < 0.0 {
                return Err("must be a positive number".to_string());
            }
            Ok(Value::from(n))
        }
        ValueRule::Bool => parse_bool(value)
            .map(Value::from)
            .ok_or_else(|| "must be 'Yes', 'No', 1, or 0".to_string()),
        ValueRule::Enum { allowed, normalize } => {
            let raw = value.as_str().map(str::trim).unwrap_or_default();
            let tag = normalize
                .iter()
                .find(|(from, _)| *from == raw)
                .map(|(_, to)| *to)
                .unwrap_or(raw);
            if allowed.contains(&tag) {
                Ok(Value::from(tag))
            } else {
                Err(format!("must be one of: {}", allowed.join(", ")))
            }
        }
        ValueRule::Text => Ok(value.clone()),
    }
}

fn bounds_message(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("must be between {} and {}", min, max),
        _ => "must be a whole number".to_string(),
    }
}

/// Integer from a JSON number or numeric string (integral floats accepted)
fn parse_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

/// Decimal from a JSON number or numeric string
fn parse_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Boolean-like coercion to 0/1
fn parse_bool(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(*b as i64),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(0),
            Some(1) => Some(1),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Some(1),
            "no" | "false" | "0" => Some(0),
            _ => None,
        },
        _ => None,
    }
}
