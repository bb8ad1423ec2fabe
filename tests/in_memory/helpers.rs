//! Shared fixtures for the in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tasktrail::activity::{
    adapters::memory::InMemoryActivityRepository, domain::ActivityAction, ports::ActivityFilter,
    services::ActivityView,
};
use tasktrail::api::{AppState, MemoryBackend};
use tasktrail::context::{Actor, ActorContext};
use tasktrail::pagination::PageRequest;
use tasktrail::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{Task, TaskId},
    services::CreateTaskRequest,
};
use tasktrail::user::{
    adapters::memory::InMemoryUserRepository,
    domain::{Email, PasswordHash, Role, User, Username},
    ports::UserRepository,
};

/// Services over one shared in-memory store plus direct access to users.
pub struct Trail {
    /// Wired services.
    pub state: AppState<MemoryBackend>,
    /// User repository behind `state`.
    pub users: Arc<InMemoryUserRepository>,
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}

/// Provides fresh services for each test.
#[fixture]
pub fn trail() -> Trail {
    Trail::new()
}

/// Returns a request context authenticated as `user`.
#[must_use]
pub fn as_user(user: &User) -> ActorContext {
    ActorContext::empty().with_actor(Actor::from_user(user))
}

impl Trail {
    /// Wires services over empty in-memory adapters.
    #[must_use]
    pub fn new() -> Self {
        let store = InMemoryTaskStore::new();
        let activities = InMemoryActivityRepository::new(&store);
        let users = Arc::new(InMemoryUserRepository::new());
        let state = AppState::new(
            Arc::new(store),
            Arc::clone(&users),
            Arc::new(activities),
            Arc::new(DefaultClock),
        );
        Self { state, users }
    }

    /// Stores an account without hashing a password.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid username or the store
    /// rejects the account.
    pub async fn account(&self, name: &str, role: Role) -> eyre::Result<User> {
        let user = User::new(
            Email::new(format!("{name}@example.com"))?,
            Username::new(name)?,
            role,
            PasswordHash::from_persisted("unused".to_owned()),
            &DefaultClock,
        );
        self.users.store(&user).await?;
        Ok(user)
    }

    /// Creates a task as `admin`, assigned to `assignees`.
    ///
    /// # Errors
    ///
    /// Returns an error if the task service rejects the request.
    pub async fn task(&self, admin: &User, title: &str, assignees: &[&User]) -> eyre::Result<Task> {
        let request =
            CreateTaskRequest::new(title).with_assignees(assignees.iter().map(|user| user.id()));
        Ok(self.state.tasks.create(&as_user(admin), request).await?)
    }

    /// Lists the activities about `task` that `reader` can see, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn history(&self, reader: &User, task: TaskId) -> eyre::Result<Vec<ActivityView>> {
        let page = self
            .state
            .activities
            .by_task(&as_user(reader), task, PageRequest::first())
            .await?;
        Ok(page.results)
    }

    /// Counts the activities with `action` that `reader` can see.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_visible(&self, reader: &User, action: ActivityAction) -> eyre::Result<u64> {
        let filter = ActivityFilter::default().with_action(action);
        let page = self
            .state
            .activities
            .list(&as_user(reader), &filter, PageRequest::first())
            .await?;
        Ok(page.count)
    }
}

/// Returns the action of every view, in order.
#[must_use]
pub fn actions(views: &[ActivityView]) -> Vec<ActivityAction> {
    views.iter().map(|view| view.entry.activity.action()).collect()
}
