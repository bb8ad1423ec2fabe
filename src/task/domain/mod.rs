//! Domain model for tasks.
//!
//! Tasks carry the tracked fields that the activity log diffs (status,
//! priority, title, description and deadline) plus the assignment set. All
//! infrastructure concerns stay outside of the domain boundary.

mod error;
mod ids;
mod task;

pub use error::{ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::{TaskId, TaskTitle};
pub use task::{NewTask, PersistedTaskData, Task, TaskEdit, TaskPriority, TaskStatus};
