//! Tasks and their assignments.
//!
//! Admins create, edit, delete and (un)assign tasks; staff read and move
//! the status of the tasks assigned to them. Each mutation goes through the
//! transactional [`ports::TaskStore`] so that the activity it produces is
//! committed atomically with it. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod tests;
