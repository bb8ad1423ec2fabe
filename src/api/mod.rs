//! HTTP surface built on axum.
//!
//! Handlers are generic over a [`Backend`], which names the adapter types
//! behind every port. The server binary picks the in-memory or `PostgreSQL`
//! backend at startup; tests drive the in-memory one through
//! `tower::ServiceExt::oneshot`.

mod activities;
mod auth;
mod error;
mod tasks;
mod users;

pub use auth::{REQUEST_ID_HEADER, RequestContext, USER_ID_HEADER};
pub use error::ApiError;
pub use users::UserResponse;

use crate::activity::adapters::{memory::InMemoryActivityRepository, postgres::PostgresActivityRepository};
use crate::activity::ports::ActivityRepository;
use crate::activity::services::ActivityQueryService;
use crate::persistence::PgPool;
use crate::task::adapters::{memory::InMemoryTaskStore, postgres::PostgresTaskStore};
use crate::task::ports::TaskStore;
use crate::task::services::TaskService;
use crate::user::adapters::{memory::InMemoryUserRepository, postgres::PostgresUserRepository};
use crate::user::ports::UserRepository;
use crate::user::services::AccountService;
use axum::{
    Json, Router,
    routing::{get, patch, post},
};
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Adapter types wired behind the HTTP surface.
pub trait Backend: Send + Sync + 'static {
    /// Task store adapter.
    type Tasks: TaskStore + 'static;
    /// User repository adapter.
    type Users: UserRepository + 'static;
    /// Activity repository adapter.
    type Activities: ActivityRepository + 'static;
    /// Clock stamping records.
    type Clock: Clock + Send + Sync + 'static;
}

/// Process-local storage.
#[derive(Debug, Clone, Copy)]
pub struct MemoryBackend;

impl Backend for MemoryBackend {
    type Tasks = InMemoryTaskStore;
    type Users = InMemoryUserRepository;
    type Activities = InMemoryActivityRepository;
    type Clock = DefaultClock;
}

/// `PostgreSQL` storage through Diesel.
#[derive(Debug, Clone, Copy)]
pub struct PostgresBackend;

impl Backend for PostgresBackend {
    type Tasks = PostgresTaskStore;
    type Users = PostgresUserRepository;
    type Activities = PostgresActivityRepository;
    type Clock = DefaultClock;
}

/// Services shared by all handlers.
pub struct AppState<B: Backend> {
    /// Account service.
    pub accounts: AccountService<B::Users, B::Clock>,
    /// Task service.
    pub tasks: TaskService<B::Tasks, B::Users, B::Clock>,
    /// Audit trail query service.
    pub activities: ActivityQueryService<B::Activities, B::Users>,
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            accounts: self.accounts.clone(),
            tasks: self.tasks.clone(),
            activities: self.activities.clone(),
        }
    }
}

impl<B: Backend> AppState<B> {
    /// Wires the services over the given adapters.
    #[must_use]
    pub fn new(
        tasks: Arc<B::Tasks>,
        users: Arc<B::Users>,
        activities: Arc<B::Activities>,
        clock: Arc<B::Clock>,
    ) -> Self {
        Self {
            accounts: AccountService::new(Arc::clone(&users), Arc::clone(&clock)),
            tasks: TaskService::new(tasks, Arc::clone(&users), clock),
            activities: ActivityQueryService::new(activities, users),
        }
    }
}

impl AppState<MemoryBackend> {
    /// Builds state over fresh in-memory adapters.
    #[must_use]
    pub fn in_memory() -> Self {
        let tasks = InMemoryTaskStore::new();
        let activities = InMemoryActivityRepository::new(&tasks);
        Self::new(
            Arc::new(tasks),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(activities),
            Arc::new(DefaultClock),
        )
    }
}

impl AppState<PostgresBackend> {
    /// Builds state over `PostgreSQL` adapters sharing `pool`.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self::new(
            Arc::new(PostgresTaskStore::new(pool.clone())),
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresActivityRepository::new(pool.clone())),
            Arc::new(DefaultClock),
        )
    }
}

/// Builds the application router.
pub fn router<B: Backend>(state: AppState<B>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(users::signup::<B>))
        .route("/auth/profile", get(users::profile::<B>))
        .route("/users", get(users::list_users::<B>))
        .route(
            "/tasks",
            get(tasks::list_tasks::<B>).post(tasks::create_task::<B>),
        )
        .route(
            "/tasks/{id}",
            get(tasks::get_task::<B>)
                .put(tasks::replace_task::<B>)
                .patch(tasks::edit_task::<B>)
                .delete(tasks::delete_task::<B>),
        )
        .route("/tasks/{id}/status", patch(tasks::update_status::<B>))
        .route(
            "/tasks/{id}/assignees",
            post(tasks::assign::<B>).delete(tasks::unassign::<B>),
        )
        .route(
            "/activities",
            get(activities::list::<B>).post(activities::reject_create::<B>),
        )
        .route("/activities/recent", get(activities::recent::<B>))
        .route("/activities/stats", get(activities::stats::<B>))
        .route("/activities/task/{id}", get(activities::by_task::<B>))
        .route("/activities/user/{id}", get(activities::by_user::<B>))
        .route(
            "/activities/{id}",
            get(activities::get::<B>)
                .put(activities::reject_update::<B>)
                .patch(activities::reject_update::<B>)
                .delete(activities::reject_delete::<B>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
