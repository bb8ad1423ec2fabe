//! Domain model for the activity audit trail.

mod action;
mod activity;
mod changes;
mod ids;
mod snapshot;

pub use action::{ActivityAction, ParseActivityActionError};
pub use activity::{Activity, NewActivity, PersistedActivityData};
pub use changes::{ActivityChanges, FieldChange, TrackedField, TrackedFields};
pub use ids::ActivityId;
pub use snapshot::{TaskInfo, TaskSnapshot};
