//! Pre-image capture for task updates.

use crate::activity::domain::TrackedFields;
use crate::task::domain::{Task, TaskId};
use crate::task::ports::{TaskStoreResult, TaskTransaction};
use std::collections::HashMap;

/// Holds the tracked fields of tasks as they were before an update.
///
/// One interceptor lives for exactly one unit of work. It is created when
/// the work starts and dropped with it, so a pre-image can never leak into
/// a later update.
#[derive(Debug, Default)]
pub struct ChangeInterceptor {
    pre_images: HashMap<TaskId, TrackedFields>,
}

impl ChangeInterceptor {
    /// Creates an interceptor with no captured pre-images.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks and reads `task_id` inside `transaction`, remembering its
    /// tracked fields.
    ///
    /// Returns `None` without capturing anything when the task does not
    /// exist. A second capture of the same task keeps the first pre-image.
    ///
    /// # Errors
    ///
    /// Returns the store error raised by the locking read.
    pub fn capture_before_update(
        &mut self,
        transaction: &mut dyn TaskTransaction,
        task_id: TaskId,
    ) -> TaskStoreResult<Option<Task>> {
        let Some(task) = transaction.lock_task(task_id)? else {
            return Ok(None);
        };
        self.pre_images
            .entry(task_id)
            .or_insert_with(|| TrackedFields::of(&task));
        Ok(Some(task))
    }

    /// Removes and returns the pre-image captured for `task_id`.
    pub fn take(&mut self, task_id: TaskId) -> Option<TrackedFields> {
        self.pre_images.remove(&task_id)
    }
}
