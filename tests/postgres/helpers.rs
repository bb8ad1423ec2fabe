//! Shared fixtures for the `PostgreSQL` integration tests.

use std::future::Future;
use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::fixture;
use tasktrail::activity::{
    adapters::postgres::PostgresActivityRepository, domain::ActivityAction, ports::ActivityFilter,
    services::ActivityView,
};
use tasktrail::api::{AppState, PostgresBackend};
use tasktrail::context::{Actor, ActorContext};
use tasktrail::pagination::PageRequest;
use tasktrail::persistence::build_pool;
use tasktrail::task::{
    adapters::postgres::PostgresTaskStore,
    domain::{Task, TaskId},
    services::CreateTaskRequest,
};
use tasktrail::user::{
    adapters::postgres::PostgresUserRepository,
    domain::{Email, PasswordHash, Role, User, Username},
    ports::UserRepository,
};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// SQL creating the full schema.
const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_task_tracker/up.sql");

/// Template database holding the migrated schema.
const TEMPLATE_DB: &str = "tasktrail_test_template";

/// Connections per test database; concurrent writers need more than one.
const POOL_SIZE: u32 = 4;

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &TestCluster) -> eyre::Result<()> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_SCHEMA_SQL)
                .map_err(|e| eyre::eyre!("migration failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| eyre::eyre!("template setup failed: {e}"))
}

/// Drops the test database once the services using it are gone.
struct CleanupGuard {
    cluster: &'static TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(self.db_name.as_str()));
    }
}

/// Services over one fresh `PostgreSQL` database.
///
/// Fields drop in declaration order, so the pools are closed before the
/// database is dropped.
pub struct Trail {
    /// Wired services.
    pub state: AppState<PostgresBackend>,
    /// User repository behind `state`.
    pub users: Arc<PostgresUserRepository>,
    /// Task store behind `state`.
    pub store: Arc<PostgresTaskStore>,
    runtime: Runtime,
    _cleanup: CleanupGuard,
}

/// Provides services over a database cloned from the migrated template.
///
/// # Errors
///
/// Returns an error if the template, database, pool or runtime cannot be
/// set up.
#[fixture]
pub fn trail(shared_test_cluster: &'static TestCluster) -> eyre::Result<Trail> {
    Trail::new(shared_test_cluster)
}

/// Returns a request context authenticated as `user`.
#[must_use]
pub fn as_user(user: &User) -> ActorContext {
    ActorContext::empty().with_actor(Actor::from_user(user))
}

impl Trail {
    /// Clones the template into a new database and wires services over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the template, database, pool or runtime cannot
    /// be set up.
    pub fn new(cluster: &'static TestCluster) -> eyre::Result<Self> {
        ensure_template(cluster)?;
        let db_name = format!("tasktrail_{}", Uuid::new_v4().simple());
        cluster
            .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
            .map_err(|e| eyre::eyre!("database creation failed: {e}"))?;
        let cleanup = CleanupGuard {
            cluster,
            db_name: db_name.clone(),
        };

        let pool = build_pool(&cluster.connection().database_url(&db_name), POOL_SIZE)?;
        let store = Arc::new(PostgresTaskStore::new(pool.clone()));
        let users = Arc::new(PostgresUserRepository::new(pool.clone()));
        let state = AppState::new(
            Arc::clone(&store),
            Arc::clone(&users),
            Arc::new(PostgresActivityRepository::new(pool)),
            Arc::new(DefaultClock),
        );
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        Ok(Self {
            state,
            users,
            store,
            runtime,
            _cleanup: cleanup,
        })
    }

    /// Drives `future` to completion on this trail's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Stores an account without hashing a password.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid username or the insert
    /// fails.
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
            .by_task(&as_user(reader), task, PageRequest::new(Some(1), Some(100)))
            .await?;
        Ok(page.results)
    }

    /// Counts the activities matching `filter` that `reader` can see.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count(&self, reader: &User, filter: &ActivityFilter) -> eyre::Result<u64> {
        let page = self
            .state
            .activities
            .list(&as_user(reader), filter, PageRequest::first())
            .await?;
        Ok(page.count)
    }

    /// Counts the activities with `action` that `reader` can see.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_visible(&self, reader: &User, action: ActivityAction) -> eyre::Result<u64> {
        self.count(reader, &ActivityFilter::default().with_action(action))
            .await
    }
}

/// Returns the action of every view, in order.
#[must_use]
pub fn actions(views: &[ActivityView]) -> Vec<ActivityAction> {
    views.iter().map(|view| view.entry.activity.action()).collect()
}
