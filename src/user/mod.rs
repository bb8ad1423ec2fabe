//! User accounts and roles.
//!
//! Users are created through signup and carry the role that gates every
//! authorisation decision in the system. The module follows the same
//! hexagonal split as the task and activity contexts:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Account services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
