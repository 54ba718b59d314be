//! SQL DDL for initializing the database schema.
//! Every statement is idempotent so startup may run it against an existing database.

/// SQLite schema includes:
/// - `formdata` table (one contact form submission per row, never updated)
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS formdata (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name TEXT NOT NULL,
    gmail TEXT NOT NULL,
    description TEXT NOT NULL,
    created_at TEXT NOT NULL -- RFC3339
);
"#;
