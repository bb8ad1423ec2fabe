//! Shared world state for activity audit trail BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tasktrail::activity::{
    adapters::memory::InMemoryActivityRepository, services::ActivityQueryError,
};
use tasktrail::api::{AppState, MemoryBackend};
use tasktrail::context::{Actor, ActorContext};
use tasktrail::task::{adapters::memory::InMemoryTaskStore, domain::TaskId};
use tasktrail::user::{adapters::memory::InMemoryUserRepository, domain::User};

/// Scenario world for audit trail behaviour tests.
pub struct AuditWorld {
    pub state: AppState<MemoryBackend>,
    pub users: Arc<InMemoryUserRepository>,
    pub accounts: HashMap<String, User>,
    pub task: Option<TaskId>,
    pub refusal: Option<ActivityQueryError>,
}

impl AuditWorld {
    /// Creates a world over empty in-memory adapters.
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

        Self {
            state,
            users,
            accounts: HashMap::new(),
            task: None,
            refusal: None,
        }
    }

    /// Returns the account registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if no such account was created in the scenario.
    pub fn account(&self, name: &str) -> Result<&User, eyre::Report> {
        self.accounts
            .get(name)
            .ok_or_else(|| eyre::eyre!("no account named {name} in scenario world"))
    }

    /// Returns a request context acting as `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if no such account was created in the scenario.
    pub fn acting_as(&self, name: &str) -> Result<ActorContext, eyre::Report> {
        let user = self.account(name)?;
        Ok(ActorContext::empty().with_actor(Actor::from_user(user)))
    }

    /// Returns the task the scenario works on.
    ///
    /// # Errors
    ///
    /// Returns an error if no task was created yet.
    pub fn task_id(&self) -> Result<TaskId, eyre::Report> {
        self.task
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for AuditWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AuditWorld {
    AuditWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
