//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Progress state.
        #[max_length = 20]
        status -> Varchar,
        /// Urgency.
        #[max_length = 10]
        priority -> Varchar,
        /// Creating user, nulled when the user is deleted.
        created_by -> Nullable<Uuid>,
        /// Optional deadline.
        deadline -> Nullable<Date>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Many-to-many link between tasks and assigned users.
    task_assignees (task_id, user_id) {
        /// Assigned task.
        task_id -> Uuid,
        /// Assigned user.
        user_id -> Uuid,
    }
}

diesel::joinable!(task_assignees -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_assignees);
