mod common;

use fnotifier::db::SubmissionCreate;

fn create(name: &str) -> SubmissionCreate {
    SubmissionCreate {
        name: name.to_string(),
        gmail: format!("{}@example.com", name.to_lowercase()),
        description: "Hello".to_string(),
    }
}

#[tokio::test]
async fn db_actor_schema_is_idempotent_and_ids_increase() {
    let db_path = common::unique_temp_path("db-actor", "sqlite");
    let database_url = common::sqlite_url(&db_path);

    let db = fnotifier::db::spawn(&database_url)
        .await
        .expect("first spawn creates the database");
    let first = db.insert_submission(create("Ada")).await.expect("insert");
    let second = db.insert_submission(create("Grace")).await.expect("insert");
    assert!(second > first, "ids must increase: {first} then {second}");

    // A second actor over the same file re-applies the schema without touching data.
    let again = fnotifier::db::spawn(&database_url)
        .await
        .expect("second spawn over existing schema");
    let third = again.insert_submission(create("Linus")).await.expect("insert");
    assert!(third > second);

    let stored = again
        .get_submission(first)
        .await
        .expect("query")
        .expect("first row still present");
    assert_eq!(stored.name, "Ada");
    assert_eq!(stored.gmail, "ada@example.com");
    assert_eq!(stored.description, "Hello");
    assert!(stored.created_at <= chrono::Utc::now());

    assert!(again.get_submission(9_999).await.expect("query").is_none());

    let pool = sqlx::SqlitePool::connect(&database_url)
        .await
        .expect("inspect database");
    let tables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'formdata'",
    )
    .fetch_one(&pool)
    .await
    .expect("count tables");
    assert_eq!(tables, 1);
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM formdata")
        .fetch_one(&pool)
        .await
        .expect("count rows");
    assert_eq!(rows, 3);
    pool.close().await;

    let _ = tokio::fs::remove_file(&db_path).await;
}

#[tokio::test]
async fn db_actor_spawn_fails_for_unreachable_database() {
    let database_url = "sqlite:/nonexistent-fnotifier-dir/nested/form.sqlite";
    let result = fnotifier::db::spawn(database_url).await;
    assert!(result.is_err(), "spawn should surface connection failures");
}
