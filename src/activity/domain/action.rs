//! Kinds of recorded activity.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What happened to the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// The task was created.
    Created,
    /// Tracked fields other than status changed.
    Updated,
    /// The task was deleted.
    Deleted,
    /// The status changed, possibly alongside other fields.
    StatusChanged,
    /// Users were added to the task.
    Assigned,
    /// Users were removed from the task.
    Unassigned,
    /// A comment was added. Reserved; no write path produces it yet.
    CommentAdded,
}

impl ActivityAction {
    /// Every action, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Created,
        Self::Updated,
        Self::Deleted,
        Self::StatusChanged,
        Self::Assigned,
        Self::Unassigned,
        Self::CommentAdded,
    ];

    /// Returns the canonical lowercase storage form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::StatusChanged => "status_changed",
            Self::Assigned => "assigned",
            Self::Unassigned => "unassigned",
            Self::CommentAdded => "comment_added",
        }
    }
}

/// Error returned when parsing an unknown action string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown activity action: {0}")]
pub struct ParseActivityActionError(pub String);

impl TryFrom<&str> for ActivityAction {
    type Error = ParseActivityActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| ParseActivityActionError(value.to_owned()))
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
