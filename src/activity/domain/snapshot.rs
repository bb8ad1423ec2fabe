//! Task details frozen at the moment an activity is recorded.

use crate::task::domain::{Task, TaskId};
use crate::user::domain::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Snapshot of the task an activity refers to.
///
/// Survives deletion of the task itself, so history stays readable and
/// filterable after the task reference has been nulled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Identifier of the task at recording time.
    pub task_id: TaskId,
    /// Title of the task at recording time.
    pub task_title: String,
    /// First assignee at recording time.
    #[serde(default)]
    pub assigned_user_id: Option<UserId>,
    /// Every assignee at recording time.
    #[serde(default)]
    pub assigned_user_ids: Vec<UserId>,
}

impl TaskSnapshot {
    /// Captures the snapshot fields from a task.
    #[must_use]
    pub fn of(task: &Task) -> Self {
        Self {
            task_id: task.id(),
            task_title: task.title().as_str().to_owned(),
            assigned_user_id: task.primary_assignee(),
            assigned_user_ids: task.assignees().iter().copied().collect(),
        }
    }

    /// Adds `user_ids` to the listed assignees.
    ///
    /// Assignees stay sorted and the first one becomes the primary assignee,
    /// as in [`TaskSnapshot::of`].
    #[must_use]
    pub fn including_assignees(mut self, user_ids: &[UserId]) -> Self {
        let merged: BTreeSet<UserId> = self
            .assigned_user_ids
            .iter()
            .chain(user_ids)
            .copied()
            .collect();
        self.assigned_user_id = merged.first().copied();
        self.assigned_user_ids = merged.into_iter().collect();
        self
    }

    /// Returns `true` when the snapshot lists `user_id` as an assignee.
    #[must_use]
    pub fn lists_assignee(&self, user_id: UserId) -> bool {
        self.assigned_user_id == Some(user_id) || self.assigned_user_ids.contains(&user_id)
    }
}

/// Task reference presented alongside an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskInfo {
    /// Task identifier.
    pub id: TaskId,
    /// Live title, or the snapshot title once the task is gone.
    pub title: String,
    /// `true` when the task no longer exists.
    pub deleted: bool,
}
