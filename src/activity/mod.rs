//! Immutable audit trail of task mutations.
//!
//! Every create, edit, delete and assignment change on a task produces at
//! most one [`domain::Activity`], written in the same transaction as the
//! mutation itself. Activities are never updated or deleted through the
//! service layer; the only change they ever see is the database nulling
//! their task reference when the task row disappears. The snapshot they
//! carry keeps the task addressable after that.
//!
//! - Domain types in [`domain`]
//! - Read-side port in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Change capture, recording and queries in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
