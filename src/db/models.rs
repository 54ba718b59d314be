use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbSubmission {
    pub id: i64,
    pub name: String,
    pub gmail: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for `formdata`. Fields are validated by the submission pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionCreate {
    pub name: String,
    pub gmail: String,
    pub description: String,
}
