//! Diesel schema for the activity audit trail.

diesel::table! {
    /// Append-only activity records.
    activities (id) {
        /// Activity identifier.
        id -> Uuid,
        /// Insertion sequence, breaks timestamp ties.
        seq -> Int8,
        /// Referenced task, nulled when the task is deleted.
        task_id -> Nullable<Uuid>,
        /// Acting user, nulled when the user is deleted.
        user_id -> Nullable<Uuid>,
        /// Lowercase action name.
        #[max_length = 50]
        action -> Varchar,
        /// Human-readable description.
        description -> Text,
        /// Field-level change payload.
        changes -> Nullable<Jsonb>,
        /// Task snapshot taken when the activity was recorded.
        snapshot -> Jsonb,
        /// Recording timestamp.
        timestamp -> Timestamptz,
    }
}
