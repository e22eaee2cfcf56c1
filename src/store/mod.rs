//! Persistence layer.
//!
//! Handlers only see the [`UserStore`] and [`TaskStore`] traits. The PostgreSQL
//! implementations live in [`postgres`]; [`memory`] provides in-process
//! doubles that honour the same contract.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Task, User};

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

/// Credential storage. Usernames are unique.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user and returns its id.
    ///
    /// Fails with `AppError::AlreadyExists` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i32, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

/// Task storage. Every operation is scoped to the owning user, so a task that
/// belongs to someone else is indistinguishable from one that does not exist.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task with status `"pending"` and returns the stored row.
    async fn create(
        &self,
        owner_id: i32,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, AppError>;

    /// Fails with `AppError::NotFound` unless a task matches both id and owner.
    async fn get_by_id(&self, task_id: i32, owner_id: i32) -> Result<Task, AppError>;

    /// All tasks of `owner_id`, newest first. Empty when there are none.
    async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError>;

    /// Fails with `AppError::NotFound` when nothing was deleted.
    async fn delete(&self, task_id: i32, owner_id: i32) -> Result<(), AppError>;
}

pub(crate) fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}
