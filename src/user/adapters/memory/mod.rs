//! In-memory user adapter for tests and database-less deployments.

mod user;

pub use user::InMemoryUserRepository;
