//! Database initialization
//!
//! Creates the SQLite database on first run and brings up the two
//! persisted tables (employees, pulse_surveys). Table creation is
//! idempotent, so every service start runs through the same path.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows the read-only analytics endpoints to keep reading while
    // an import batch commits
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Initialize an in-memory database for tests.
///
/// Uses a single-connection pool: every connection to `:memory:` gets its
/// own private database, so the pool must never hand out a second one.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent, safe to call multiple times)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_employees_table(pool).await?;
    create_pulse_surveys_table(pool).await?;

    info!("Database tables initialized (employees, pulse_surveys)");

    Ok(())
}

/// Create the employees table.
///
/// `employee_id` is the natural key used for import correlation and
/// upsert conflict resolution. Contributor lists are stored as JSON text.
pub async fn create_employees_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            employee_id INTEGER PRIMARY KEY,
            full_name TEXT NOT NULL,
            age INTEGER,
            gender TEXT,
            years_of_experience REAL,
            job_role TEXT,
            salary REAL,
            performance_rating INTEGER,
            number_of_promotions INTEGER,
            overtime INTEGER,
            commuting_distance REAL,
            education_level TEXT,
            marital_status TEXT,
            number_of_dependents INTEGER,
            job_level INTEGER,
            last_hike REAL,
            years_in_current_role REAL,
            working_model TEXT,
            working_hours REAL,
            department TEXT,
            no_of_companies_worked_previously INTEGER,
            leaves_taken INTEGER,
            years_with_company REAL,
            attrition_score REAL,
            attrition INTEGER,
            top_positive_contributors TEXT,
            top_negative_contributors TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (age IS NULL OR (age >= 18 AND age <= 100)),
            CHECK (performance_rating IS NULL OR (performance_rating >= 1 AND performance_rating <= 5)),
            CHECK (job_level IS NULL OR (job_level >= 1 AND job_level <= 10)),
            CHECK (attrition_score IS NULL OR (attrition_score >= 0.0 AND attrition_score <= 1.0))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_employees_department ON employees(department)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the pulse_surveys table.
///
/// One survey row per employee: `employee_id` is UNIQUE and re-imports
/// overwrite the previous responses via the upsert path.
pub async fn create_pulse_surveys_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pulse_surveys (
            survey_id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL UNIQUE REFERENCES employees(employee_id),
            full_name TEXT,
            work_life_balance INTEGER,
            job_satisfaction INTEGER,
            relationship_with_manager INTEGER,
            communication_effectiveness INTEGER,
            recognition_reward_sat INTEGER,
            career_growth_opportunities INTEGER,
            alignment_with_company_values INTEGER,
            perceived_fairness INTEGER,
            team_cohesion_support INTEGER,
            autonomy_at_work INTEGER,
            overall_engagement INTEGER,
            training_skill_dev_sat INTEGER,
            stress_levels INTEGER,
            org_change_readiness INTEGER,
            feedback_usefulness INTEGER,
            flexibility_support INTEGER,
            conflict_at_work INTEGER,
            perceived_job_security INTEGER,
            environment_satisfaction INTEGER,
            survey_date TEXT,
            attrition_score REAL,
            attrition INTEGER,
            top_positive_contributors TEXT,
            top_negative_contributors TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pulse_surveys_employee ON pulse_surveys(employee_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
