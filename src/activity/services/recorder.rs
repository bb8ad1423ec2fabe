//! Builds activity records from task mutations.

use crate::activity::domain::{
    Activity, ActivityAction, ActivityChanges, NewActivity, TaskSnapshot, TrackedField,
    TrackedFields,
};
use crate::task::domain::Task;
use crate::user::domain::{User, UserId};
use mockable::Clock;
use std::sync::Arc;

/// Direction of an assignment batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentChange {
    /// Users were added.
    Assigned,
    /// Users were removed.
    Unassigned,
}

/// Turns task mutations into [`Activity`] records.
///
/// The recorder is pure: it never writes. Callers insert what it returns
/// through the transaction that performed the mutation. Every method
/// attributes the activity to `actor`, falling back to the task's creator
/// when no actor is known.
pub struct ActivityRecorder<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
}

impl<C> Clone for ActivityRecorder<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> ActivityRecorder<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a recorder stamping activities with `clock`.
    #[must_use]
    pub const fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    /// Records the creation of `task`.
    #[must_use]
    pub fn task_created(&self, task: &Task, actor: Option<UserId>) -> Activity {
        let params = NewActivity::new(ActivityAction::Created, TaskSnapshot::of(task))
            .by(attribute(actor, task))
            .with_description(format!("Task \"{}\" was created", task.title()))
            .with_changes(ActivityChanges::created(task.status(), task.priority()));
        Activity::new(params, &*self.clock)
    }

    /// Records an update by diffing `pre_image` against `task`.
    ///
    /// Returns `None` when there is no pre-image or no tracked field
    /// changed. A status change makes the action `status_changed`.
    #[must_use]
    pub fn task_updated(
        &self,
        pre_image: Option<TrackedFields>,
        task: &Task,
        actor: Option<UserId>,
    ) -> Option<Activity> {
        let before = pre_image?;
        let changes = before.diff(&TrackedFields::of(task));
        if changes.is_empty() {
            return None;
        }

        let action = if changes
            .iter()
            .any(|change| change.field() == TrackedField::Status)
        {
            ActivityAction::StatusChanged
        } else {
            ActivityAction::Updated
        };
        let clauses: Vec<&str> = changes.iter().map(|change| change.clause()).collect();
        let params = NewActivity::new(action, TaskSnapshot::of(task))
            .by(attribute(actor, task))
            .with_description(format!("Task \"{}\": {}", task.title(), clauses.join(", ")))
            .with_changes(ActivityChanges::from_field_changes(&changes));
        Some(Activity::new(params, &*self.clock))
    }

    /// Records the deletion of `task`, captured before it was removed.
    #[must_use]
    pub fn task_deleted(&self, task: &Task, actor: Option<UserId>) -> Activity {
        let params = NewActivity::new(ActivityAction::Deleted, TaskSnapshot::of(task))
            .without_task()
            .by(attribute(actor, task))
            .with_description(format!("Task \"{}\" was deleted", task.title()))
            .with_changes(ActivityChanges::deleted(task.id()));
        Activity::new(params, &*self.clock)
    }

    /// Records one assignment batch on `task`.
    ///
    /// `users` must hold only the users actually added or removed. Returns
    /// `None` for an empty batch.
    #[must_use]
    pub fn assignment_changed(
        &self,
        task: &Task,
        change: AssignmentChange,
        users: &[User],
        actor: Option<UserId>,
    ) -> Option<Activity> {
        if users.is_empty() {
            return None;
        }

        let names: Vec<&str> = users.iter().map(|user| user.username().as_str()).collect();
        let ids: Vec<UserId> = users.iter().map(User::id).collect();
        let (action, verb, changes, snapshot) = match change {
            AssignmentChange::Assigned => (
                ActivityAction::Assigned,
                "assigned to",
                ActivityChanges::assigned(&ids),
                TaskSnapshot::of(task),
            ),
            // Removed users stay in the snapshot so they can read their own unassignment.
            AssignmentChange::Unassigned => (
                ActivityAction::Unassigned,
                "unassigned from",
                ActivityChanges::unassigned(&ids),
                TaskSnapshot::of(task).including_assignees(&ids),
            ),
        };
        let params = NewActivity::new(action, snapshot)
            .by(attribute(actor, task))
            .with_description(format!(
                "{} {verb} task \"{}\"",
                names.join(", "),
                task.title()
            ))
            .with_changes(changes);
        Some(Activity::new(params, &*self.clock))
    }
}

fn attribute(actor: Option<UserId>, task: &Task) -> Option<UserId> {
    actor.or_else(|| task.created_by())
}
