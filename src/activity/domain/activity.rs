//! Activity record.

use super::{ActivityAction, ActivityChanges, ActivityId, TaskInfo, TaskSnapshot};
use crate::task::domain::TaskId;
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

/// Parameters for recording an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    action: ActivityAction,
    snapshot: TaskSnapshot,
    task: Option<TaskId>,
    user: Option<UserId>,
    description: String,
    changes: Option<ActivityChanges>,
}

impl NewActivity {
    /// Starts an activity about the task described by `snapshot`.
    ///
    /// The task reference defaults to the snapshot's task.
    #[must_use]
    pub const fn new(action: ActivityAction, snapshot: TaskSnapshot) -> Self {
        Self {
            action,
            task: Some(snapshot.task_id),
            snapshot,
            user: None,
            description: String::new(),
            changes: None,
        }
    }

    /// Drops the live task reference, for tasks that are being deleted.
    #[must_use]
    pub const fn without_task(mut self) -> Self {
        self.task = None;
        self
    }

    /// Attributes the activity to a user.
    #[must_use]
    pub const fn by(mut self, user: Option<UserId>) -> Self {
        self.user = user;
        self
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the change payload.
    #[must_use]
    pub fn with_changes(mut self, changes: ActivityChanges) -> Self {
        self.changes = Some(changes);
        self
    }
}

/// One immutable entry of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    id: ActivityId,
    task: Option<TaskId>,
    user: Option<UserId>,
    action: ActivityAction,
    description: String,
    changes: Option<ActivityChanges>,
    snapshot: TaskSnapshot,
    timestamp: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedActivityData {
    /// Persisted identifier.
    pub id: ActivityId,
    /// Live task reference, `None` once the task is deleted.
    pub task: Option<TaskId>,
    /// Acting user, `None` when unknown or deleted.
    pub user: Option<UserId>,
    /// Persisted action.
    pub action: ActivityAction,
    /// Persisted description.
    pub description: String,
    /// Persisted change payload.
    pub changes: Option<ActivityChanges>,
    /// Persisted task snapshot.
    pub snapshot: TaskSnapshot,
    /// Recording timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Activity {
    /// Records a new activity stamped with the clock's current time.
    #[must_use]
    pub fn new(params: NewActivity, clock: &impl Clock) -> Self {
        Self {
            id: ActivityId::new(),
            task: params.task,
            user: params.user,
            action: params.action,
            description: params.description,
            changes: params.changes,
            snapshot: params.snapshot,
            timestamp: clock.utc(),
        }
    }

    /// Reconstructs an activity from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedActivityData) -> Self {
        Self {
            id: data.id,
            task: data.task,
            user: data.user,
            action: data.action,
            description: data.description,
            changes: data.changes,
            snapshot: data.snapshot,
            timestamp: data.timestamp,
        }
    }

    /// Returns the activity identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityId {
        self.id
    }

    /// Returns the live task reference.
    #[must_use]
    pub const fn task(&self) -> Option<TaskId> {
        self.task
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn user(&self) -> Option<UserId> {
        self.user
    }

    /// Returns the action.
    #[must_use]
    pub const fn action(&self) -> ActivityAction {
        self.action
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the change payload.
    #[must_use]
    pub const fn changes(&self) -> Option<&ActivityChanges> {
        self.changes.as_ref()
    }

    /// Returns the task snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &TaskSnapshot {
        &self.snapshot
    }

    /// Returns the recording timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Resolves the task reference for presentation.
    ///
    /// `live_title` is the current title of the referenced task, when it
    /// still exists.
    #[must_use]
    pub fn task_info(&self, live_title: Option<&str>) -> TaskInfo {
        match (self.task, live_title) {
            (Some(id), Some(title)) => TaskInfo {
                id,
                title: title.to_owned(),
                deleted: false,
            },
            _ => TaskInfo {
                id: self.snapshot.task_id,
                title: self.snapshot.task_title.clone(),
                deleted: true,
            },
        }
    }

    /// Nulls the task reference after the task row is deleted.
    pub(crate) const fn detach_task(&mut self) {
        self.task = None;
    }
}
