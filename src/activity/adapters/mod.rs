//! Adapter implementations for activity queries.

pub mod memory;
pub mod postgres;
