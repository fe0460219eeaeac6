//! Database operations, one module per table

pub mod employees;
pub mod surveys;

use serde_json::Value;
use sqlx::query_builder::Separated;
use sqlx::Sqlite;

/// Bind one coerced field value into a VALUES tuple. Validated values
/// are scalars; anything else is stored as its JSON text.
fn bind_field(b: &mut Separated<'_, '_, Sqlite, &'static str>, value: Option<&Value>) {
    match value {
        None | Some(Value::Null) => {
            b.push_bind(None::<String>);
        }
        Some(Value::Bool(v)) => {
            b.push_bind(*v as i64);
        }
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                b.push_bind(i);
            } else {
                b.push_bind(n.as_f64().unwrap_or_default());
            }
        }
        Some(Value::String(s)) => {
            b.push_bind(s.clone());
        }
        Some(other) => {
            b.push_bind(other.to_string());
        }
    }
}

/// Contributor lists come back from the store as JSON text
fn parse_json_text(text: Option<String>) -> Value {
    text.and_then(|t| serde_json::from_str(&t).ok())
        .unwrap_or(Value::Null)
}
