//! `PostgreSQL` adapter for activity queries.

pub(crate) mod models;
mod repository;
pub(crate) mod schema;

#[cfg(test)]
pub(crate) use repository::{like_pattern, row_to_entry, to_new_row};
pub(crate) use repository::insert_activity;
pub use repository::PostgresActivityRepository;
