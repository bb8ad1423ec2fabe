//! Transactional store port for tasks.
//!
//! Every task mutation runs as a synchronous unit of work against a
//! [`TaskTransaction`]. The activity describing a mutation is inserted
//! through the same transaction, so either both become visible or neither
//! does.

use crate::activity::domain::Activity;
use crate::task::domain::{Task, TaskId};
use crate::user::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Operations available inside an open unit of work.
pub trait TaskTransaction {
    /// Reads a task and locks it until the unit of work ends.
    ///
    /// Returns `None` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the read fails.
    fn lock_task(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Inserts a new task together with its assignees.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the identifier exists.
    fn insert_task(&mut self, task: &Task) -> TaskStoreResult<()>;

    /// Persists every field and the assignee set of an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    fn save_task(&mut self, task: &Task) -> TaskStoreResult<()>;

    /// Deletes a task. Activities referring to it keep their snapshot and
    /// lose their task reference.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    fn delete_task(&mut self, id: TaskId) -> TaskStoreResult<()>;

    /// Appends an activity to the audit trail.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the insert fails.
    fn insert_activity(&mut self, activity: &Activity) -> TaskStoreResult<()>;
}

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Runs `work` inside one transaction.
    ///
    /// Changes are committed only when `work` returns `Ok`; on `Err`
    /// nothing it did is persisted.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a [`TaskStoreError`]
    /// converted into `E` when the transaction itself fails.
    async fn transact<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static;

    /// Finds a task by identifier.
    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Returns every task, newest first.
    async fn list_all(&self) -> TaskStoreResult<Vec<Task>>;

    /// Returns the tasks `user_id` is assigned to, newest first.
    async fn list_assigned_to(&self, user_id: UserId) -> TaskStoreResult<Vec<Task>>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
