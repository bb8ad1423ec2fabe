//! `PostgreSQL` adapter for task persistence.

pub(crate) mod models;
pub(crate) mod schema;
mod store;

#[cfg(test)]
pub(crate) use store::{row_to_task, to_new_row};
pub use store::PostgresTaskStore;
