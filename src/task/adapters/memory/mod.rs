//! In-memory task adapter for tests and database-less deployments.

mod store;

pub(crate) use store::StoreState;
pub use store::InMemoryTaskStore;
