//! Import column schemas
//!
//! Each entity kind has an immutable schema: the required column set,
//! per-field value rules, and the natural-key / display-name columns.
//! Column names match the import file headers exactly.

use super::record::EntityKind;

/// Value constraint for one import column
#[derive(Debug, Clone, Copy)]
pub enum ValueRule {
    /// Natural key: required, must parse as an integer
    Key,
    /// Display name: required, non-empty string
    Name,
    /// Integer, optionally bounded (inclusive)
    Int {
        min: Option<i64>,
        max: Option<i64>,
    },
    /// Decimal number; `non_negative` rejects values below zero
    Num { non_negative: bool },
    /// Boolean-like: Yes/No/1/0/true/false, coerced to 0/1
    Bool,
    /// Fixed tag set; `normalize` maps accepted synonyms onto tags
    Enum {
        allowed: &'static [&'static str],
        normalize: &'static [(&'static str, &'static str)],
    },
    /// Free text, no constraint beyond being a scalar
    Text,
}

/// One column's rule
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub column: &'static str,
    pub rule: ValueRule,
}

/// Immutable per-entity-kind import schema
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub entity: &'static str,
    pub key_column: &'static str,
    pub name_column: &'static str,
    pub fields: &'static [FieldRule],
}

impl Schema {
    /// All columns are required: the first row's column set must be a
    /// superset of these.
    pub fn required_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.column)
    }
}

/// Schema for the given entity kind
pub fn schema_for(kind: EntityKind) -> &'static Schema {
    match kind {
        EntityKind::Employee => &EMPLOYEE_SCHEMA,
        EntityKind::PulseSurvey => &SURVEY_SCHEMA,
    }
}

const fn int_range(min: i64, max: i64) -> ValueRule {
    ValueRule::Int {
        min: Some(min),
        max: Some(max),
    }
}

const INT: ValueRule = ValueRule::Int {
    min: None,
    max: None,
};
const NUM: ValueRule = ValueRule::Num {
    non_negative: false,
};
const NON_NEG_NUM: ValueRule = ValueRule::Num { non_negative: true };
const RATING: ValueRule = int_range(1, 5);

static EMPLOYEE_FIELDS: &[FieldRule] = &[
    FieldRule { column: "Employee ID", rule: ValueRule::Key },
    FieldRule { column: "Full Name", rule: ValueRule::Name },
    FieldRule { column: "Age", rule: int_range(18, 100) },
    FieldRule {
        column: "Gender",
        rule: ValueRule::Enum {
            allowed: &["M", "F", "O"],
            normalize: &[("Male", "M"), ("Female", "F"), ("Other", "O")],
        },
    },
    FieldRule { column: "Years of experience", rule: NON_NEG_NUM },
    FieldRule { column: "Job Role", rule: ValueRule::Text },
    FieldRule { column: "Salary", rule: NON_NEG_NUM },
    FieldRule { column: "Performance Rating", rule: RATING },
    FieldRule { column: "Number of Promotions", rule: INT },
    FieldRule { column: "Overtime", rule: ValueRule::Bool },
    FieldRule { column: "Commuting distance", rule: NUM },
    FieldRule {
        column: "Education Level",
        rule: ValueRule::Enum {
            allowed: &["Graduate", "Post-Graduate", "Diploma", "School", "Doctorate"],
            normalize: &[],
        },
    },
    FieldRule {
        column: "Marital Status",
        rule: ValueRule::Enum {
            allowed: &["Single", "Married", "Divorced", "Widowed"],
            normalize: &[],
        },
    },
    FieldRule { column: "Number of Dependents", rule: INT },
    FieldRule { column: "Job Level", rule: int_range(1, 10) },
    FieldRule { column: "Last hike", rule: NUM },
    FieldRule { column: "Years in current role", rule: NUM },
    FieldRule {
        column: "Working model",
        rule: ValueRule::Enum {
            allowed: &["Remote", "Hybrid", "Onsite"],
            normalize: &[("On-site", "Onsite")],
        },
    },
    FieldRule { column: "Working hours", rule: NUM },
    FieldRule { column: "Department", rule: ValueRule::Text },
    FieldRule { column: "No. of companies worked previously", rule: INT },
    FieldRule { column: "LeavesTaken", rule: INT },
    FieldRule { column: "YearsWithCompany", rule: NUM },
];

static SURVEY_FIELDS: &[FieldRule] = &[
    FieldRule { column: "Employee ID", rule: ValueRule::Key },
    FieldRule { column: "Full Name", rule: ValueRule::Name },
    FieldRule { column: "Work-Life Balance", rule: RATING },
    FieldRule { column: "Job Satisfaction", rule: RATING },
    FieldRule { column: "Relationship with Manager", rule: RATING },
    FieldRule { column: "Communication effectiveness", rule: RATING },
    FieldRule { column: "Recognition and Reward Satisfaction", rule: RATING },
    FieldRule { column: "Career growth and advancement opportunities", rule: RATING },
    FieldRule { column: "Alignment with Company Values/Mission", rule: RATING },
    FieldRule { column: "Perceived fairness", rule: RATING },
    FieldRule { column: "Team cohesion and peer support", rule: RATING },
    FieldRule { column: "Autonomy at work", rule: RATING },
    FieldRule { column: "Overall engagement", rule: RATING },
    FieldRule { column: "Training and skill development satisfaction", rule: RATING },
    FieldRule { column: "Stress levels/work pressure", rule: RATING },
    FieldRule { column: "Organizational change readiness", rule: RATING },
    FieldRule { column: "Feedback frequency and usefulness", rule: RATING },
    FieldRule { column: "Flexibility support", rule: RATING },
    FieldRule { column: "Conflict at work", rule: RATING },
    FieldRule { column: "Perceived job security", rule: RATING },
    FieldRule { column: "Environment satisfaction", rule: RATING },
];

static EMPLOYEE_SCHEMA: Schema = Schema {
    entity: "employee",
    key_column: "Employee ID",
    name_column: "Full Name",
    fields: EMPLOYEE_FIELDS,
};

static SURVEY_SCHEMA: Schema = Schema {
    entity: "survey",
    key_column: "Employee ID",
    name_column: "Full Name",
    fields: SURVEY_FIELDS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_schema_has_23_required_columns() {
        assert_eq!(EMPLOYEE_SCHEMA.required_columns().count(), 23);
    }

    #[test]
    fn survey_schema_has_21_required_columns() {
        // Employee ID + Full Name + 19 rating fields
        assert_eq!(SURVEY_SCHEMA.required_columns().count(), 21);
    }

    #[test]
    fn key_and_name_columns_are_required() {
        for schema in [&EMPLOYEE_SCHEMA, &SURVEY_SCHEMA] {
            let cols: Vec<_> = schema.required_columns().collect();
            assert!(cols.contains(&schema.key_column));
            assert!(cols.contains(&schema.name_column));
        }
    }
}
