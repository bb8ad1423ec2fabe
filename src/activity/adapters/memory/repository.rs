//! In-memory repository for activity queries.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::activity::{
    domain::{Activity, ActivityAction, ActivityId},
    ports::{
        ActivityEntry, ActivityFilter, ActivityRepository, ActivityRepositoryError,
        ActivityRepositoryResult, Visibility,
    },
};
use crate::task::adapters::memory::{InMemoryTaskStore, StoreState};

/// Activity repository reading the state of an [`InMemoryTaskStore`].
///
/// Sharing the store's state keeps activities consistent with the task
/// writes that produced them and lets visibility see live assignees.
#[derive(Debug, Clone)]
pub struct InMemoryActivityRepository {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryActivityRepository {
    /// Creates a repository over the activities written by `store`.
    #[must_use]
    pub fn new(store: &InMemoryTaskStore) -> Self {
        Self {
            state: store.shared_state(),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> ActivityRepositoryResult<T> {
        let state = self.state.read().map_err(|err| {
            ActivityRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(f(&state))
    }
}

fn to_entry(state: &StoreState, activity: &Activity) -> ActivityEntry {
    let live_title = activity
        .task()
        .and_then(|id| state.tasks.get(&id))
        .map(|task| task.title().as_str());
    ActivityEntry {
        activity: activity.clone(),
        task_info: activity.task_info(live_title),
    }
}

fn is_visible(state: &StoreState, activity: &Activity, visibility: Visibility) -> bool {
    match visibility {
        Visibility::All => true,
        Visibility::Member(user_id) => {
            activity.user() == Some(user_id)
                || activity.snapshot().lists_assignee(user_id)
                || activity
                    .task()
                    .and_then(|id| state.tasks.get(&id))
                    .is_some_and(|task| task.is_assigned_to(user_id))
        }
    }
}

fn matches(filter: &ActivityFilter, entry: &ActivityEntry) -> bool {
    let activity = &entry.activity;
    if filter
        .task
        .is_some_and(|task_id| activity.snapshot().task_id != task_id)
    {
        return false;
    }
    if filter.user.is_some_and(|user_id| activity.user() != Some(user_id)) {
        return false;
    }
    if filter.action.is_some_and(|action| activity.action() != action) {
        return false;
    }
    filter.search.as_deref().is_none_or(|term| {
        let needle = term.to_lowercase();
        activity.description().to_lowercase().contains(&needle)
            || entry.task_info.title.to_lowercase().contains(&needle)
    })
}

/// Visible entries matching `filter`, newest first.
fn select(state: &StoreState, visibility: Visibility, filter: &ActivityFilter) -> Vec<ActivityEntry> {
    let mut entries: Vec<ActivityEntry> = state
        .activities
        .iter()
        .rev()
        .filter(|activity| is_visible(state, activity, visibility))
        .map(|activity| to_entry(state, activity))
        .filter(|entry| matches(filter, entry))
        .collect();
    // Stable sort keeps reverse insertion order among equal timestamps.
    entries.sort_by(|left, right| right.activity.timestamp().cmp(&left.activity.timestamp()));
    entries
}

fn to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn count(
        &self,
        visibility: Visibility,
        filter: &ActivityFilter,
    ) -> ActivityRepositoryResult<u64> {
        self.read(|state| to_u64(select(state, visibility, filter).len()))
    }

    async fn find_page(
        &self,
        visibility: Visibility,
        filter: &ActivityFilter,
        offset: u64,
        limit: u64,
    ) -> ActivityRepositoryResult<Vec<ActivityEntry>> {
        self.read(|state| {
            select(state, visibility, filter)
                .into_iter()
                .skip(to_usize(offset))
                .take(to_usize(limit))
                .collect()
        })
    }

    async fn find_by_id(
        &self,
        id: ActivityId,
        visibility: Visibility,
    ) -> ActivityRepositoryResult<Option<ActivityEntry>> {
        self.read(|state| {
            state
                .activities
                .iter()
                .find(|activity| activity.id() == id)
                .filter(|activity| is_visible(state, activity, visibility))
                .map(|activity| to_entry(state, activity))
        })
    }

    async fn count_by_action(
        &self,
        visibility: Visibility,
    ) -> ActivityRepositoryResult<Vec<(ActivityAction, u64)>> {
        self.read(|state| {
            let mut counts: BTreeMap<ActivityAction, u64> = BTreeMap::new();
            for activity in state
                .activities
                .iter()
                .filter(|activity| is_visible(state, activity, visibility))
            {
                *counts.entry(activity.action()).or_default() += 1;
            }
            counts.into_iter().collect()
        })
    }
}
