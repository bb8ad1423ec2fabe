//! Tasktrail: task tracking with an immutable activity audit trail.
//!
//! Every task mutation is recorded as an [`activity::domain::Activity`] in
//! the same unit of work as the mutation itself. Activities snapshot the
//! task they describe, so the trail stays readable after the task is gone.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Orchestration, authorisation and logging
//!
//! # Modules
//!
//! - [`user`]: Accounts, roles and password hashing
//! - [`task`]: Task aggregate, transactional store and commands
//! - [`activity`]: Change capture, activity recording and audit queries
//! - [`api`]: axum HTTP surface

pub mod activity;
pub mod api;
pub mod config;
pub mod context;
pub mod pagination;
pub mod persistence;
pub mod task;
pub mod telemetry;
pub mod user;
