//! Port contracts for reading the activity audit trail.
//!
//! Activities are written only through the task store's transaction, so
//! this port is read-only.

pub mod repository;

pub use repository::{
    ActivityEntry, ActivityFilter, ActivityRepository, ActivityRepositoryError,
    ActivityRepositoryResult, Visibility,
};
