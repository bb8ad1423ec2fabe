//! Read-only access to the audit trail with role-based visibility.

use crate::activity::{
    domain::{ActivityAction, ActivityId},
    ports::{ActivityEntry, ActivityFilter, ActivityRepository, ActivityRepositoryError, Visibility},
};
use crate::context::{Actor, ActorContext, MissingActor};
use crate::pagination::{Page, PageRequest};
use crate::task::domain::TaskId;
use crate::user::{
    domain::{User, UserId},
    ports::{UserRepository, UserRepositoryError},
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of activities returned by [`ActivityQueryService::recent`].
pub const RECENT_LIMIT: u64 = 50;

/// Number of activities included in [`ActivityStats::recent`].
pub const STATS_RECENT_LIMIT: u64 = 10;

/// Service-level errors for audit trail queries.
#[derive(Debug, Error)]
pub enum ActivityQueryError {
    /// No authenticated actor is bound to the request.
    #[error(transparent)]
    Unauthenticated(#[from] MissingActor),
    /// The activity does not exist or is not visible to the actor.
    #[error("activity not found: {0}")]
    NotFound(ActivityId),
    /// Activities cannot be created, edited or deleted directly.
    #[error("Activity logs are immutable and cannot be created, modified, or deleted.")]
    RecordImmutable,
    /// Activity lookup failed.
    #[error(transparent)]
    Repository(#[from] ActivityRepositoryError),
    /// Resolving acting users failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),
}

/// Result type for audit trail queries.
pub type ActivityQueryResult<T> = Result<T, ActivityQueryError>;

/// An activity as presented to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityView {
    /// Stored activity and its resolved task reference.
    pub entry: ActivityEntry,
    /// Acting user, when still known.
    pub actor: Option<User>,
}

/// Activity counts per action plus the latest entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityStats {
    /// Number of visible activities.
    pub total: u64,
    /// Visible activities per action, omitting actions with none.
    pub by_action: BTreeMap<ActivityAction, u64>,
    /// Most recent visible activities.
    pub recent: Vec<ActivityView>,
}

/// Audit trail query service.
pub struct ActivityQueryService<A, U>
where
    A: ActivityRepository,
    U: UserRepository,
{
    activities: Arc<A>,
    users: Arc<U>,
}

impl<A, U> Clone for ActivityQueryService<A, U>
where
    A: ActivityRepository,
    U: UserRepository,
{
    fn clone(&self) -> Self {
        Self {
            activities: Arc::clone(&self.activities),
            users: Arc::clone(&self.users),
        }
    }
}

fn refuse(context: &ActorContext, operation: &'static str, id: Option<ActivityId>) -> ActivityQueryError {
    warn!(
        event = "activity.mutation_rejected",
        operation,
        activity_id = ?id,
        actor_id = ?context.actor_id(),
        correlation_id = ?context.correlation_id(),
        "Rejected direct activity mutation"
    );
    ActivityQueryError::RecordImmutable
}

fn visibility_for(actor: &Actor) -> Visibility {
    if actor.is_admin() {
        Visibility::All
    } else {
        Visibility::Member(actor.id())
    }
}

impl<A, U> ActivityQueryService<A, U>
where
    A: ActivityRepository,
    U: UserRepository,
{
    /// Creates a new query service.
    #[must_use]
    pub const fn new(activities: Arc<A>, users: Arc<U>) -> Self {
        Self { activities, users }
    }

    /// Lists visible activities matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityQueryError::Unauthenticated`] without an actor.
    pub async fn list(
        &self,
        context: &ActorContext,
        filter: &ActivityFilter,
        request: PageRequest,
    ) -> ActivityQueryResult<Page<ActivityView>> {
        let visibility = visibility_for(context.require_actor()?);
        let count = self.activities.count(visibility, filter).await?;
        let entries = self
            .activities
            .find_page(visibility, filter, request.offset(), request.page_size())
            .await?;
        debug!(
            event = "activity.list",
            correlation_id = ?context.correlation_id(),
            count,
            page = request.page(),
            "Listed activities"
        );
        let views = self.with_actors(entries).await?;
        Ok(Page::new(request, count, views))
    }

    /// Returns one visible activity.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityQueryError::NotFound`] when the activity does not
    /// exist or the actor may not see it.
    pub async fn get(&self, context: &ActorContext, id: ActivityId) -> ActivityQueryResult<ActivityView> {
        let visibility = visibility_for(context.require_actor()?);
        let entry = self
            .activities
            .find_by_id(id, visibility)
            .await?
            .ok_or(ActivityQueryError::NotFound(id))?;
        let mut views = self.with_actors(vec![entry]).await?;
        views.pop().ok_or(ActivityQueryError::NotFound(id))
    }

    /// Lists visible activities about one task, including after deletion.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityQueryError::Unauthenticated`] without an actor.
    pub async fn by_task(
        &self,
        context: &ActorContext,
        task_id: TaskId,
        request: PageRequest,
    ) -> ActivityQueryResult<Page<ActivityView>> {
        let filter = ActivityFilter::default().for_task(task_id);
        self.list(context, &filter, request).await
    }

    /// Lists visible activities performed by one user.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityQueryError::Unauthenticated`] without an actor.
    pub async fn by_user(
        &self,
        context: &ActorContext,
        user_id: UserId,
        request: PageRequest,
    ) -> ActivityQueryResult<Page<ActivityView>> {
        let filter = ActivityFilter::default().by_user(user_id);
        self.list(context, &filter, request).await
    }

    /// Returns the latest [`RECENT_LIMIT`] visible activities.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityQueryError::Unauthenticated`] without an actor.
    pub async fn recent(&self, context: &ActorContext) -> ActivityQueryResult<Vec<ActivityView>> {
        let visibility = visibility_for(context.require_actor()?);
        self.latest(visibility, RECENT_LIMIT).await
    }

    /// Summarises the visible audit trail.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityQueryError::Unauthenticated`] without an actor.
    pub async fn stats(&self, context: &ActorContext) -> ActivityQueryResult<ActivityStats> {
        let visibility = visibility_for(context.require_actor()?);
        let by_action: BTreeMap<ActivityAction, u64> = self
            .activities
            .count_by_action(visibility)
            .await?
            .into_iter()
            .collect();
        let total = by_action.values().sum();
        let recent = self.latest(visibility, STATS_RECENT_LIMIT).await?;
        Ok(ActivityStats {
            total,
            by_action,
            recent,
        })
    }

    /// Direct creation is refused for every role.
    ///
    /// # Errors
    ///
    /// Always returns [`ActivityQueryError::RecordImmutable`].
    pub fn create(&self, context: &ActorContext) -> ActivityQueryResult<()> {
        Err(refuse(context, "create", None))
    }

    /// Direct edits are refused for every role.
    ///
    /// # Errors
    ///
    /// Always returns [`ActivityQueryError::RecordImmutable`].
    pub fn update(&self, context: &ActorContext, id: ActivityId) -> ActivityQueryResult<()> {
        Err(refuse(context, "update", Some(id)))
    }

    /// Direct deletion is refused for every role.
    ///
    /// # Errors
    ///
    /// Always returns [`ActivityQueryError::RecordImmutable`].
    pub fn delete(&self, context: &ActorContext, id: ActivityId) -> ActivityQueryResult<()> {
        Err(refuse(context, "delete", Some(id)))
    }

    async fn latest(
        &self,
        visibility: Visibility,
        limit: u64,
    ) -> ActivityQueryResult<Vec<ActivityView>> {
        let entries = self
            .activities
            .find_page(visibility, &ActivityFilter::default(), 0, limit)
            .await?;
        self.with_actors(entries).await
    }

    async fn with_actors(&self, entries: Vec<ActivityEntry>) -> ActivityQueryResult<Vec<ActivityView>> {
        let mut ids: Vec<UserId> = entries
            .iter()
            .filter_map(|entry| entry.activity.user())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        let users: HashMap<UserId, User> = self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|user| (user.id(), user))
            .collect();

        Ok(entries
            .into_iter()
            .map(|entry| {
                let actor = entry
                    .activity
                    .user()
                    .and_then(|user_id| users.get(&user_id).cloned());
                ActivityView { entry, actor }
            })
            .collect())
    }
}
