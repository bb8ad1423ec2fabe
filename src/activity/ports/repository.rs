//! Repository port for activity queries.

use crate::activity::domain::{Activity, ActivityAction, ActivityId, TaskInfo};
use crate::task::domain::TaskId;
use crate::user::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for activity repository operations.
pub type ActivityRepositoryResult<T> = Result<T, ActivityRepositoryError>;

/// Which activities a reader may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Every activity.
    All,
    /// Activities on tasks the user is assigned to now, activities the user
    /// performed, and activities whose snapshot lists the user as assignee.
    Member(UserId),
}

/// Optional narrowing applied inside the visible set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    /// Task identifier, matched against the snapshot so deleted tasks
    /// remain addressable.
    pub task: Option<TaskId>,
    /// Acting user.
    pub user: Option<UserId>,
    /// Action kind.
    pub action: Option<ActivityAction>,
    /// Case-insensitive substring of the description or task title.
    pub search: Option<String>,
}

impl ActivityFilter {
    /// Restricts results to one task.
    #[must_use]
    pub const fn for_task(mut self, task: TaskId) -> Self {
        self.task = Some(task);
        self
    }

    /// Restricts results to one acting user.
    #[must_use]
    pub const fn by_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    /// Restricts results to one action.
    #[must_use]
    pub const fn with_action(mut self, action: ActivityAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Restricts results to a search term. Blank terms are ignored.
    #[must_use]
    pub fn with_search(mut self, term: &str) -> Self {
        let trimmed = term.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }
}

/// An activity together with its resolved task reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    /// The stored activity.
    pub activity: Activity,
    /// Live task reference or snapshot fallback.
    pub task_info: TaskInfo,
}

/// Activity query contract.
///
/// Listings are ordered by timestamp, newest first, with ties broken by
/// most recent insertion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Counts the visible activities matching `filter`.
    async fn count(
        &self,
        visibility: Visibility,
        filter: &ActivityFilter,
    ) -> ActivityRepositoryResult<u64>;

    /// Returns one page of visible activities matching `filter`.
    async fn find_page(
        &self,
        visibility: Visibility,
        filter: &ActivityFilter,
        offset: u64,
        limit: u64,
    ) -> ActivityRepositoryResult<Vec<ActivityEntry>>;

    /// Finds one activity, or `None` when it does not exist or is not
    /// visible.
    async fn find_by_id(
        &self,
        id: ActivityId,
        visibility: Visibility,
    ) -> ActivityRepositoryResult<Option<ActivityEntry>>;

    /// Counts visible activities per action. Actions with no activity are
    /// omitted.
    async fn count_by_action(
        &self,
        visibility: Visibility,
    ) -> ActivityRepositoryResult<Vec<(ActivityAction, u64)>>;
}

/// Errors returned by activity repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ActivityRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActivityRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
