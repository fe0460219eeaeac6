//! Database initialization tests

use retain_common::db::init;

#[tokio::test]
async fn test_memory_database_has_tables() {
    let pool = init::init_memory_database()
        .await
        .expect("Failed to create in-memory database");

    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
    assert!(names.contains(&"employees"), "employees table missing");
    assert!(names.contains(&"pulse_surveys"), "pulse_surveys table missing");
}

#[tokio::test]
async fn test_create_tables_is_idempotent() {
    let pool = init::init_memory_database().await.unwrap();

    // Second pass must not error on existing tables or indexes
    init::create_tables(&pool).await.expect("re-creation failed");
}

#[tokio::test]
async fn test_init_database_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("retain.db");

    let pool = init::init_database(&db_path)
        .await
        .expect("Failed to initialize database");

    assert!(db_path.exists(), "database file not created");

    // Basic smoke query against the new schema
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_employee_check_constraints() {
    let pool = init::init_memory_database().await.unwrap();

    // Age below 18 violates the table CHECK
    let result = sqlx::query("INSERT INTO employees (employee_id, full_name, age) VALUES (1, 'X', 17)")
        .execute(&pool)
        .await;
    assert!(result.is_err(), "CHECK constraint should reject age 17");

    sqlx::query("INSERT INTO employees (employee_id, full_name, age) VALUES (1, 'X', 18)")
        .execute(&pool)
        .await
        .expect("age 18 is valid");
}
