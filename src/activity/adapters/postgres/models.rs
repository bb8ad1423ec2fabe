//! Diesel row models for activity persistence.

use super::schema::activities;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Jsonb, Nullable, Text, Timestamptz, Uuid, Varchar};
use serde_json::Value;

/// Insert model for activity records. `seq` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activities)]
pub struct NewActivityRow {
    pub id: uuid::Uuid,
    pub task_id: Option<uuid::Uuid>,
    pub user_id: Option<uuid::Uuid>,
    pub action: String,
    pub description: String,
    pub changes: Option<Value>,
    pub snapshot: Value,
    pub timestamp: DateTime<Utc>,
}

/// Query result row joining an activity with its live task title.
#[derive(Debug, Clone, QueryableByName)]
pub struct ActivityEntryRow {
    #[diesel(sql_type = Uuid)]
    pub id: uuid::Uuid,
    #[diesel(sql_type = Nullable<Uuid>)]
    pub task_id: Option<uuid::Uuid>,
    #[diesel(sql_type = Nullable<Uuid>)]
    pub user_id: Option<uuid::Uuid>,
    #[diesel(sql_type = Varchar)]
    pub action: String,
    #[diesel(sql_type = Text)]
    pub description: String,
    #[diesel(sql_type = Nullable<Jsonb>)]
    pub changes: Option<Value>,
    #[diesel(sql_type = Jsonb)]
    pub snapshot: Value,
    #[diesel(sql_type = Timestamptz)]
    pub timestamp: DateTime<Utc>,
    #[diesel(sql_type = Nullable<Varchar>)]
    pub live_title: Option<String>,
}

/// Single `COUNT(*)` result.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

/// Per-action count result.
#[derive(Debug, Clone, QueryableByName)]
pub struct ActionCountRow {
    #[diesel(sql_type = Varchar)]
    pub action: String,
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}
