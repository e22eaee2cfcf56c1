//! In-process stores used for handler-level tests and local experiments.
//! They follow the exact contract of the PostgreSQL stores, including owner
//! scoping and newest-first ordering.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{task_not_found, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Task, User, DEFAULT_TASK_STATUS};

struct Table<T> {
    next_id: i32,
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn lock<T>(table: &Mutex<Table<T>>) -> Result<MutexGuard<'_, Table<T>>, AppError> {
    table
        .lock()
        .map_err(|_| AppError::StorageError("in-memory table lock poisoned".into()))
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Table<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i32, AppError> {
        let mut table = lock(&self.users)?;
        if table.rows.iter().any(|u| u.username == username) {
            return Err(AppError::AlreadyExists(format!(
                "Username '{}' is already taken",
                username
            )));
        }
        let id = table.allocate_id();
        table.rows.push(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let table = lock(&self.users)?;
        Ok(table.rows.iter().find(|u| u.username == username).cloned())
    }
}

#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Table<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(
        &self,
        owner_id: i32,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, AppError> {
        let mut table = lock(&self.tasks)?;
        let task = Task {
            id: table.allocate_id(),
            title: title.to_string(),
            description: description.map(str::to_string),
            status: DEFAULT_TASK_STATUS.to_string(),
            owner_id,
            created_at: Utc::now(),
        };
        table.rows.push(task.clone());
        Ok(task)
    }

    async fn get_by_id(&self, task_id: i32, owner_id: i32) -> Result<Task, AppError> {
        let table = lock(&self.tasks)?;
        table
            .rows
            .iter()
            .find(|t| t.id == task_id && t.owner_id == owner_id)
            .cloned()
            .ok_or_else(task_not_found)
    }

    async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let table = lock(&self.tasks)?;
        let mut tasks: Vec<Task> = table
            .rows
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn delete(&self, task_id: i32, owner_id: i32) -> Result<(), AppError> {
        let mut table = lock(&self.tasks)?;
        let before = table.rows.len();
        table
            .rows
            .retain(|t| !(t.id == task_id && t.owner_id == owner_id));
        if table.rows.len() == before {
            return Err(task_not_found());
        }
        Ok(())
    }
}
