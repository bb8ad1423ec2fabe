//! Tracked task fields and the change payload stored with an activity.

use crate::task::domain::{Task, TaskId, TaskPriority, TaskStatus, TaskTitle};
use crate::user::domain::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// A task field whose changes are audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedField {
    /// Task status.
    Status,
    /// Task priority.
    Priority,
    /// Task title.
    Title,
    /// Task description.
    Description,
    /// Task deadline.
    Deadline,
}

impl TrackedField {
    /// Every tracked field, in the order clauses appear in descriptions.
    pub const ALL: [Self; 5] = [
        Self::Status,
        Self::Priority,
        Self::Title,
        Self::Description,
        Self::Deadline,
    ];

    /// Returns the key used in the `changes` payload.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Priority => "priority",
            Self::Title => "title",
            Self::Description => "description",
            Self::Deadline => "deadline",
        }
    }

    fn value(self, fields: &TrackedFields) -> Value {
        match self {
            Self::Status => Value::from(fields.status.as_str()),
            Self::Priority => Value::from(fields.priority.as_str()),
            Self::Title => Value::from(fields.title.as_str()),
            Self::Description => Value::from(fields.description.as_str()),
            Self::Deadline => fields
                .deadline
                .map_or(Value::Null, |date| Value::from(date.to_string())),
        }
    }

    fn clause(self, before: &TrackedFields, after: &TrackedFields) -> String {
        match self {
            Self::Status => format!(
                "Status changed from '{}' to '{}'",
                before.status, after.status
            ),
            Self::Priority => format!(
                "Priority changed from '{}' to '{}'",
                before.priority, after.priority
            ),
            Self::Title => "Title changed".to_owned(),
            Self::Description => "Description updated".to_owned(),
            Self::Deadline => "Deadline changed".to_owned(),
        }
    }
}

/// Values of every tracked field at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFields {
    status: TaskStatus,
    priority: TaskPriority,
    title: TaskTitle,
    description: String,
    deadline: Option<NaiveDate>,
}

impl TrackedFields {
    /// Captures the tracked fields of a task.
    #[must_use]
    pub fn of(task: &Task) -> Self {
        Self {
            status: task.status(),
            priority: task.priority(),
            title: task.title().clone(),
            description: task.description().to_owned(),
            deadline: task.deadline(),
        }
    }

    /// Returns the captured status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the captured title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Compares `self` (the pre-image) against `after`.
    ///
    /// Returns one entry per field whose value differs, in
    /// [`TrackedField::ALL`] order.
    #[must_use]
    pub fn diff(&self, after: &Self) -> Vec<FieldChange> {
        TrackedField::ALL
            .into_iter()
            .filter_map(|field| {
                let old = field.value(self);
                let new = field.value(after);
                (old != new).then(|| FieldChange {
                    field,
                    old,
                    new,
                    clause: field.clause(self, after),
                })
            })
            .collect()
    }
}

/// A single field-level difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    field: TrackedField,
    old: Value,
    new: Value,
    clause: String,
}

impl FieldChange {
    /// Returns the field that changed.
    #[must_use]
    pub const fn field(&self) -> TrackedField {
        self.field
    }

    /// Returns the previous value in storage form.
    #[must_use]
    pub const fn old(&self) -> &Value {
        &self.old
    }

    /// Returns the new value in storage form.
    #[must_use]
    pub const fn new_value(&self) -> &Value {
        &self.new
    }

    /// Returns the human-readable description clause.
    #[must_use]
    pub fn clause(&self) -> &str {
        &self.clause
    }
}

/// JSON object describing what an activity changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityChanges(BTreeMap<String, Value>);

impl ActivityChanges {
    /// Initial values recorded for a created task.
    #[must_use]
    pub fn created(status: TaskStatus, priority: TaskPriority) -> Self {
        Self::from_pairs([
            ("status", Value::from(status.as_str())),
            ("priority", Value::from(priority.as_str())),
        ])
    }

    /// Old/new pairs for every changed field.
    #[must_use]
    pub fn from_field_changes(changes: &[FieldChange]) -> Self {
        Self(
            changes
                .iter()
                .map(|change| {
                    (
                        change.field.key().to_owned(),
                        json!({ "old": change.old, "new": change.new }),
                    )
                })
                .collect(),
        )
    }

    /// Identifier of a deleted task.
    #[must_use]
    pub fn deleted(task_id: TaskId) -> Self {
        Self::from_pairs([("task_id", Value::from(task_id.to_string()))])
    }

    /// Users added to a task.
    #[must_use]
    pub fn assigned(users: &[UserId]) -> Self {
        Self::from_pairs([("assigned_users", user_list(users))])
    }

    /// Users removed from a task.
    #[must_use]
    pub fn unassigned(users: &[UserId]) -> Self {
        Self::from_pairs([("unassigned_users", user_list(users))])
    }

    /// Rebuilds changes from a stored JSON value.
    ///
    /// Returns `None` for anything other than a JSON object.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map.into_iter().collect())),
            _ => None,
        }
    }

    /// Returns the stored JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<String, Value>>(),
        )
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` when `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns `true` when no key is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn from_pairs<const N: usize>(pairs: [(&str, Value); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value))
                .collect(),
        )
    }
}

fn user_list(users: &[UserId]) -> Value {
    Value::Array(
        users
            .iter()
            .map(|user| Value::from(user.to_string()))
            .collect(),
    )
}
