//! Step definitions for the activity audit trail scenarios.

pub mod given;
pub mod world;
