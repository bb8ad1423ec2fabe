//! Service layer for task commands and role-checked reads.
//!
//! Every mutation runs as one unit of work on the [`TaskStore`]: the task
//! write and the activity describing it commit together or not at all.

use crate::activity::services::{ActivityRecorder, AssignmentChange, ChangeInterceptor};
use crate::context::{Actor, ActorContext, MissingActor};
use crate::task::{
    domain::{
        NewTask, Task, TaskDomainError, TaskEdit, TaskId, TaskPriority, TaskStatus, TaskTitle,
    },
    ports::{TaskStore, TaskStoreError},
};
use crate::user::{
    domain::{User, UserId},
    ports::{UserRepository, UserRepositoryError},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    assignees: Vec<UserId>,
    deadline: Option<NaiveDate>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            assignees: Vec::new(),
            deadline: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial status by name.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the priority by name.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the initial assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = assignees.into_iter().collect();
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn into_new_task(self, created_by: UserId) -> Result<NewTask, TaskDomainError> {
        let mut params = NewTask::new(TaskTitle::new(self.title)?)
            .with_created_by(created_by)
            .with_assignees(self.assignees);
        if let Some(description) = self.description {
            params = params.with_description(description);
        }
        if let Some(status) = self.status {
            params = params.with_status(TaskStatus::try_from(status.as_str())?);
        }
        if let Some(priority) = self.priority {
            params = params.with_priority(TaskPriority::try_from(priority.as_str())?);
        }
        if let Some(deadline) = self.deadline {
            params = params.with_deadline(deadline);
        }
        Ok(params)
    }
}

/// Request payload for a partial task edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    deadline: Option<Option<NaiveDate>>,
}

impl UpdateTaskRequest {
    /// Creates a request that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the status by name.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Replaces the priority by name.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Replaces the deadline; `None` clears it.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn into_edit(self) -> Result<TaskEdit, TaskDomainError> {
        Ok(TaskEdit {
            title: self.title.map(TaskTitle::new).transpose()?,
            description: self.description,
            status: self
                .status
                .as_deref()
                .map(TaskStatus::try_from)
                .transpose()?,
            priority: self
                .priority
                .as_deref()
                .map(TaskPriority::try_from)
                .transpose()?,
            deadline: self.deadline,
        })
    }
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),
    /// No authenticated actor is bound to the request.
    #[error(transparent)]
    Unauthenticated(#[from] MissingActor),
    /// The actor may not perform the operation.
    #[error("{0}")]
    Forbidden(&'static str),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// A referenced user does not exist.
    #[error("user does not exist: {0}")]
    UserNotFound(UserId),
    /// Task persistence failed.
    #[error(transparent)]
    Store(TaskStoreError),
    /// User lookup failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),
}

impl From<TaskStoreError> for TaskServiceError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

fn require_admin(actor: &Actor, message: &'static str) -> TaskServiceResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(TaskServiceError::Forbidden(message))
    }
}

fn require_admin_or_assignee(
    actor: &Actor,
    task: &Task,
    message: &'static str,
) -> TaskServiceResult<()> {
    if actor.is_admin() || task.is_assigned_to(actor.id()) {
        Ok(())
    } else {
        Err(TaskServiceError::Forbidden(message))
    }
}

/// Task command and query service.
pub struct TaskService<S, U, C>
where
    S: TaskStore,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    users: Arc<U>,
    clock: Arc<C>,
    recorder: ActivityRecorder<C>,
}

impl<S, U, C> Clone for TaskService<S, U, C>
where
    S: TaskStore,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            users: Arc::clone(&self.users),
            clock: Arc::clone(&self.clock),
            recorder: self.recorder.clone(),
        }
    }
}

impl<S, U, C> TaskService<S, U, C>
where
    S: TaskStore,
    U: UserRepository,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task service.
    #[must_use]
    pub fn new(store: Arc<S>, users: Arc<U>, clock: Arc<C>) -> Self {
        let recorder = ActivityRecorder::new(Arc::clone(&clock));
        Self {
            store,
            users,
            clock,
            recorder,
        }
    }

    /// Creates a task and records its creation; admin only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Forbidden`] for staff actors,
    /// [`TaskServiceError::Validation`] for invalid fields and
    /// [`TaskServiceError::UserNotFound`] for unknown assignees.
    pub async fn create(
        &self,
        context: &ActorContext,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let actor = context.require_actor()?;
        require_admin(actor, "Only admin users can create tasks.")?;
        let params = request.into_new_task(actor.id())?;
        self.resolve_users(params.assignees()).await?;

        let task = Task::new(params, &*self.clock);
        let activity = self.recorder.task_created(&task, Some(actor.id()));
        let stored = task.clone();
        self.store
            .transact(move |transaction| {
                transaction.insert_task(&stored)?;
                transaction.insert_activity(&activity)?;
                Ok::<_, TaskServiceError>(())
            })
            .await?;

        info!(
            event = "task.created",
            task_id = %task.id(),
            actor_id = %actor.id(),
            correlation_id = ?context.correlation_id(),
            "Task created"
        );
        Ok(task)
    }

    /// Returns one task; staff may only read tasks assigned to them.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist
    /// and [`TaskServiceError::Forbidden`] when a staff actor is not
    /// assigned.
    pub async fn get(&self, context: &ActorContext, id: TaskId) -> TaskServiceResult<Task> {
        let actor = context.require_actor()?;
        let task = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))?;
        require_admin_or_assignee(actor, &task, "You do not have permission to view this task.")?;
        Ok(task)
    }

    /// Lists every task for admins, or the actor's assigned tasks for staff.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Unauthenticated`] without an actor.
    pub async fn list(&self, context: &ActorContext) -> TaskServiceResult<Vec<Task>> {
        let actor = context.require_actor()?;
        let tasks = if actor.is_admin() {
            self.store.list_all().await?
        } else {
            self.store.list_assigned_to(actor.id()).await?
        };
        Ok(tasks)
    }

    /// Applies a partial edit; admin only.
    ///
    /// Records `updated` or `status_changed` when a tracked field changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`],
    /// [`TaskServiceError::Forbidden`] or
    /// [`TaskServiceError::Validation`], in that order of precedence.
    pub async fn update(
        &self,
        context: &ActorContext,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let actor = context.require_actor()?.clone();
        let recorder = self.recorder.clone();
        let clock = Arc::clone(&self.clock);
        let actor_id = actor.id();

        let (task, recorded) = self
            .store
            .transact(move |transaction| {
                let mut interceptor = ChangeInterceptor::new();
                let mut task = interceptor
                    .capture_before_update(transaction, id)?
                    .ok_or(TaskServiceError::NotFound(id))?;
                require_admin(&actor, "Only admin users can edit tasks.")?;
                task.apply_edit(request.into_edit()?, &*clock);
                transaction.save_task(&task)?;
                let activity = recorder.task_updated(interceptor.take(id), &task, Some(actor.id()));
                if let Some(record) = &activity {
                    transaction.insert_activity(record)?;
                }
                Ok::<_, TaskServiceError>((task, activity.map(|record| record.action())))
            })
            .await?;

        info!(
            event = "task.updated",
            task_id = %id,
            actor_id = %actor_id,
            activity = ?recorded,
            correlation_id = ?context.correlation_id(),
            "Task updated"
        );
        Ok(task)
    }

    /// Changes only the status; allowed for admins and assigned staff.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`],
    /// [`TaskServiceError::Forbidden`] or
    /// [`TaskServiceError::Validation`] for an unknown status.
    pub async fn update_status(
        &self,
        context: &ActorContext,
        id: TaskId,
        status: &str,
    ) -> TaskServiceResult<Task> {
        let actor = context.require_actor()?.clone();
        let requested = status.to_owned();
        let recorder = self.recorder.clone();
        let clock = Arc::clone(&self.clock);
        let actor_id = actor.id();

        let task = self
            .store
            .transact(move |transaction| {
                let mut interceptor = ChangeInterceptor::new();
                let mut task = interceptor
                    .capture_before_update(transaction, id)?
                    .ok_or(TaskServiceError::NotFound(id))?;
                require_admin_or_assignee(
                    &actor,
                    &task,
                    "You do not have permission to update this task.",
                )?;
                let next = TaskStatus::try_from(requested.as_str()).map_err(TaskDomainError::from)?;
                task.apply_edit(TaskEdit::status_only(next), &*clock);
                transaction.save_task(&task)?;
                if let Some(activity) =
                    recorder.task_updated(interceptor.take(id), &task, Some(actor.id()))
                {
                    transaction.insert_activity(&activity)?;
                }
                Ok::<_, TaskServiceError>(task)
            })
            .await?;

        info!(
            event = "task.status_updated",
            task_id = %id,
            actor_id = %actor_id,
            status = %task.status(),
            correlation_id = ?context.correlation_id(),
            "Task status updated"
        );
        Ok(task)
    }

    /// Deletes a task and records the deletion; admin only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] or
    /// [`TaskServiceError::Forbidden`].
    pub async fn delete(&self, context: &ActorContext, id: TaskId) -> TaskServiceResult<()> {
        let actor = context.require_actor()?.clone();
        let recorder = self.recorder.clone();
        let actor_id = actor.id();

        self.store
            .transact(move |transaction| {
                let task = transaction
                    .lock_task(id)?
                    .ok_or(TaskServiceError::NotFound(id))?;
                require_admin(&actor, "Only admin users can delete tasks.")?;
                let activity = recorder.task_deleted(&task, Some(actor.id()));
                transaction.delete_task(id)?;
                transaction.insert_activity(&activity)?;
                Ok::<_, TaskServiceError>(())
            })
            .await?;

        info!(
            event = "task.deleted",
            task_id = %id,
            actor_id = %actor_id,
            correlation_id = ?context.correlation_id(),
            "Task deleted"
        );
        Ok(())
    }

    /// Adds users to a task; admin only.
    ///
    /// Users already assigned are ignored. One `assigned` activity lists the
    /// users actually added; none is written when nobody was added.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Forbidden`],
    /// [`TaskServiceError::UserNotFound`] or [`TaskServiceError::NotFound`].
    pub async fn assign(
        &self,
        context: &ActorContext,
        id: TaskId,
        users: &[UserId],
    ) -> TaskServiceResult<Task> {
        self.change_assignment(context, id, users, AssignmentChange::Assigned)
            .await
    }

    /// Removes users from a task; admin only.
    ///
    /// Users not currently assigned are ignored. One `unassigned` activity
    /// lists the users actually removed; none is written when nobody was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Forbidden`],
    /// [`TaskServiceError::UserNotFound`] or [`TaskServiceError::NotFound`].
    pub async fn unassign(
        &self,
        context: &ActorContext,
        id: TaskId,
        users: &[UserId],
    ) -> TaskServiceResult<Task> {
        self.change_assignment(context, id, users, AssignmentChange::Unassigned)
            .await
    }

    async fn change_assignment(
        &self,
        context: &ActorContext,
        id: TaskId,
        users: &[UserId],
        change: AssignmentChange,
    ) -> TaskServiceResult<Task> {
        let actor = context.require_actor()?;
        require_admin(actor, "Only admin users can change task assignments.")?;
        let requested: BTreeSet<UserId> = users.iter().copied().collect();
        let resolved = self.resolve_users(&requested).await?;

        let recorder = self.recorder.clone();
        let clock = Arc::clone(&self.clock);
        let actor_id = actor.id();
        let (task, changed) = self
            .store
            .transact(move |transaction| {
                let mut task = transaction
                    .lock_task(id)?
                    .ok_or(TaskServiceError::NotFound(id))?;
                let changed_ids = match change {
                    AssignmentChange::Assigned => task.assign(requested, &*clock),
                    AssignmentChange::Unassigned => task.unassign(requested, &*clock),
                };
                if changed_ids.is_empty() {
                    return Ok((task, 0));
                }
                transaction.save_task(&task)?;
                let changed_users: Vec<User> = resolved
                    .into_iter()
                    .filter(|user| changed_ids.contains(&user.id()))
                    .collect();
                if let Some(activity) =
                    recorder.assignment_changed(&task, change, &changed_users, Some(actor_id))
                {
                    transaction.insert_activity(&activity)?;
                }
                Ok::<_, TaskServiceError>((task, changed_ids.len()))
            })
            .await?;

        info!(
            event = "task.assignment_changed",
            task_id = %id,
            actor_id = %actor_id,
            change = ?change,
            changed,
            correlation_id = ?context.correlation_id(),
            "Task assignment changed"
        );
        Ok(task)
    }

    /// Loads `ids`, ordered by username, failing on the first unknown one.
    async fn resolve_users(&self, ids: &BTreeSet<UserId>) -> TaskServiceResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let lookup: Vec<UserId> = ids.iter().copied().collect();
        let found = self.users.find_by_ids(&lookup).await?;
        if let Some(missing) = lookup
            .iter()
            .find(|id| !found.iter().any(|user| user.id() == **id))
        {
            return Err(TaskServiceError::UserNotFound(*missing));
        }
        Ok(found)
    }
}
