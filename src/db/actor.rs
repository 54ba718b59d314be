use crate::db::models::{DbSubmission, SubmissionCreate};
use crate::db::schema::SQLITE_INIT;
use crate::error::FnotifierError;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Insert a submission and return its assigned id.
    InsertSubmission(SubmissionCreate, RpcReplyPort<Result<i64, FnotifierError>>),

    /// Get a submission by id.
    GetSubmission(i64, RpcReplyPort<Result<Option<DbSubmission>, FnotifierError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn insert_submission(&self, create: SubmissionCreate) -> Result<i64, FnotifierError> {
        ractor::call!(self.actor, DbActorMessage::InsertSubmission, create).map_err(|e| {
            FnotifierError::RactorError(format!("DbActor InsertSubmission RPC failed: {e}"))
        })?
    }

    pub async fn get_submission(&self, id: i64) -> Result<Option<DbSubmission>, FnotifierError> {
        ractor::call!(self.actor, DbActorMessage::GetSubmission, id).map_err(|e| {
            FnotifierError::RactorError(format!("DbActor GetSubmission RPC failed: {e}"))
        })?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::InsertSubmission(create, reply) => {
                let res = insert_submission(&state.pool, create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetSubmission(id, reply) => {
                let res = get_submission(&state.pool, id).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

async fn insert_submission(
    pool: &SqlitePool,
    create: SubmissionCreate,
) -> Result<i64, FnotifierError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO formdata (name, gmail, description, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(create.name)
    .bind(create.gmail)
    .bind(create.description)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn get_submission(pool: &SqlitePool, id: i64) -> Result<Option<DbSubmission>, FnotifierError> {
    let row = sqlx::query_as::<_, DbSubmission>(
        r#"
        SELECT id, name, gmail, description, created_at
        FROM formdata
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Spawn the database actor, creating the schema if needed, and return a cloneable handle.
///
/// Connection or schema failures surface here so the caller can refuse to start.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, FnotifierError> {
    let (actor, _jh) = Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| FnotifierError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), FnotifierError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
