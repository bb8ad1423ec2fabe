//! In-memory transactional task store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::activity::domain::Activity;
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction},
};
use crate::user::domain::UserId;

/// State shared between the task store and the in-memory activity
/// repository.
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) tasks: HashMap<TaskId, Task>,
    /// Activities in insertion order.
    pub(crate) activities: Vec<Activity>,
}

/// Thread-safe in-memory task store.
///
/// A unit of work holds the write lock, reads through the committed state
/// and stages its writes. The staged tasks and activities are applied only
/// when the work succeeds, so writers are serialised and a failed unit of
/// work leaves nothing behind.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn shared_state(&self) -> Arc<RwLock<StoreState>> {
        Arc::clone(&self.state)
    }
}

pub(crate) fn poisoned(err: &impl ToString) -> TaskStoreError {
    TaskStoreError::persistence(std::io::Error::other(err.to_string()))
}

fn newest_first(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| right.id().cmp(&left.id()))
    });
    tasks
}

/// Writes of one unit of work, not yet visible to readers.
#[derive(Default)]
struct StagedWrites {
    /// `None` marks a deleted task.
    tasks: HashMap<TaskId, Option<Task>>,
    activities: Vec<Activity>,
}

impl StagedWrites {
    fn apply(self, state: &mut StoreState) {
        state.activities.extend(self.activities);
        for (id, task) in self.tasks {
            if let Some(task) = task {
                state.tasks.insert(id, task);
                continue;
            }
            state.tasks.remove(&id);
            state
                .activities
                .iter_mut()
                .filter(|activity| activity.task() == Some(id))
                .for_each(Activity::detach_task);
        }
    }
}

struct MemoryTransaction<'a> {
    committed: &'a StoreState,
    staged: StagedWrites,
}

impl MemoryTransaction<'_> {
    fn current(&self, id: TaskId) -> Option<&Task> {
        match self.staged.tasks.get(&id) {
            Some(staged) => staged.as_ref(),
            None => self.committed.tasks.get(&id),
        }
    }
}

impl TaskTransaction for MemoryTransaction<'_> {
    fn lock_task(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        Ok(self.current(id).cloned())
    }

    fn insert_task(&mut self, task: &Task) -> TaskStoreResult<()> {
        if self.current(task.id()).is_some() {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        self.staged.tasks.insert(task.id(), Some(task.clone()));
        Ok(())
    }

    fn save_task(&mut self, task: &Task) -> TaskStoreResult<()> {
        if self.current(task.id()).is_none() {
            return Err(TaskStoreError::NotFound(task.id()));
        }
        self.staged.tasks.insert(task.id(), Some(task.clone()));
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> TaskStoreResult<()> {
        if self.current(id).is_none() {
            return Err(TaskStoreError::NotFound(id));
        }
        self.staged.tasks.insert(id, None);
        Ok(())
    }

    fn insert_activity(&mut self, activity: &Activity) -> TaskStoreResult<()> {
        self.staged.activities.push(activity.clone());
        Ok(())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn transact<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static,
    {
        let mut state = self.state.write().map_err(|err| E::from(poisoned(&err)))?;
        let mut transaction = MemoryTransaction {
            committed: &state,
            staged: StagedWrites::default(),
        };
        let value = work(&mut transaction)?;
        let staged = transaction.staged;
        staged.apply(&mut state);
        Ok(value)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_all(&self) -> TaskStoreResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(newest_first(state.tasks.values().cloned().collect()))
    }

    async fn list_assigned_to(&self, user_id: UserId) -> TaskStoreResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(newest_first(
            state
                .tasks
                .values()
                .filter(|task| task.is_assigned_to(user_id))
                .cloned()
                .collect(),
        ))
    }
}
