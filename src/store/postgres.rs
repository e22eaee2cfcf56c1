//! PostgreSQL-backed stores built on a shared `sqlx::PgPool`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{task_not_found, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Task, User, DEFAULT_TASK_STATUS};

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_BACKOFF: Duration = Duration::from_secs(2);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const QUERY_TIMEOUT: Duration = Duration::from_secs(5);
const LIST_TIMEOUT: Duration = Duration::from_secs(10);
const SCHEMA_TIMEOUT: Duration = Duration::from_secs(10);

const TASK_COLUMNS: &str = "id, title, description, status, owner_id, created_at";

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(64) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS tasks (
        id SERIAL PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        description TEXT,
        status VARCHAR(50) NOT NULL DEFAULT 'pending',
        owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE INDEX IF NOT EXISTS tasks_owner_id_idx ON tasks (owner_id, created_at DESC)",
];

/// Opens the connection pool, retrying a fixed number of times with a fixed
/// pause between attempts.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let mut last_error = None;

    for attempt in 1..=CONNECT_ATTEMPTS {
        log::info!(
            "Connecting to PostgreSQL (attempt {}/{})",
            attempt,
            CONNECT_ATTEMPTS
        );
        match PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                log::info!("Connected to PostgreSQL");
                return Ok(pool);
            }
            Err(e) => {
                log::warn!(
                    "PostgreSQL connection failed: {}. Retrying in {:?}",
                    e,
                    CONNECT_BACKOFF
                );
                last_error = Some(e);
            }
        }
        if attempt < CONNECT_ATTEMPTS {
            tokio::time::sleep(CONNECT_BACKOFF).await;
        }
    }

    Err(AppError::StorageError(format!(
        "could not connect to PostgreSQL after {} attempts: {}",
        CONNECT_ATTEMPTS,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// Creates the tables and indexes if they do not exist yet. Safe to run on
/// every start.
pub async fn bootstrap_schema(pool: &PgPool) -> Result<(), AppError> {
    for statement in SCHEMA {
        bounded("schema bootstrap", SCHEMA_TIMEOUT, sqlx::query(statement).execute(pool)).await?;
    }
    log::info!("Database schema is up to date");
    Ok(())
}

/// Runs a database future under its own deadline.
async fn bounded<T, F>(operation: &str, limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::StorageError(format!(
            "{} timed out after {:?}",
            operation, limit
        ))),
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i32, AppError> {
        let insert = sqlx::query_scalar::<_, i32>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool);

        match tokio::time::timeout(QUERY_TIMEOUT, insert).await {
            Ok(Ok(id)) => {
                log::info!("Registered user {} with id {}", username, id);
                Ok(id)
            }
            Ok(Err(sqlx::Error::Database(db_err))) if db_err.is_unique_violation() => Err(
                AppError::AlreadyExists(format!("Username '{}' is already taken", username)),
            ),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(AppError::StorageError(format!(
                "create user timed out after {:?}",
                QUERY_TIMEOUT
            ))),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        bounded(
            "find user",
            QUERY_TIMEOUT,
            sqlx::query_as::<_, User>(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
            )
            .bind(username)
            .fetch_optional(&self.pool),
        )
        .await
    }
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(
        &self,
        owner_id: i32,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, status, owner_id) VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = bounded(
            "create task",
            QUERY_TIMEOUT,
            sqlx::query_as::<_, Task>(&sql)
                .bind(title)
                .bind(description)
                .bind(DEFAULT_TASK_STATUS)
                .bind(owner_id)
                .fetch_one(&self.pool),
        )
        .await?;
        log::debug!("Created task {} for user {}", task.id, owner_id);
        Ok(task)
    }

    async fn get_by_id(&self, task_id: i32, owner_id: i32) -> Result<Task, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
            TASK_COLUMNS
        );
        bounded(
            "get task",
            QUERY_TIMEOUT,
            sqlx::query_as::<_, Task>(&sql)
                .bind(task_id)
                .bind(owner_id)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(task_not_found)
    }

    async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
            TASK_COLUMNS
        );
        bounded(
            "list tasks",
            LIST_TIMEOUT,
            sqlx::query_as::<_, Task>(&sql)
                .bind(owner_id)
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn delete(&self, task_id: i32, owner_id: i32) -> Result<(), AppError> {
        let result = bounded(
            "delete task",
            QUERY_TIMEOUT,
            sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
                .bind(task_id)
                .bind(owner_id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(task_not_found());
        }
        log::debug!("Deleted task {} of user {}", task_id, owner_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_bounded_maps_elapsed_deadline_to_storage_error() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, sqlx::Error>(1)
        };
        match bounded("slow op", Duration::from_millis(10), slow).await {
            Err(AppError::StorageError(msg)) => assert!(msg.contains("slow op timed out")),
            other => panic!("expected storage timeout, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_bounded_passes_through_sqlx_errors() {
        let missing = async { Err::<i32, _>(sqlx::Error::RowNotFound) };
        assert!(matches!(
            bounded("lookup", QUERY_TIMEOUT, missing).await,
            Err(AppError::NotFound(_))
        ));
    }
}
