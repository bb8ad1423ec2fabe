//! Application services for task commands and queries.

mod commands;

pub use commands::{
    CreateTaskRequest, TaskService, TaskServiceError, TaskServiceResult, UpdateTaskRequest,
};
