//! `PostgreSQL` repository implementation for activity queries.

use super::{
    models::{ActionCountRow, ActivityEntryRow, CountRow, NewActivityRow},
    schema::activities,
};
use crate::activity::{
    domain::{
        Activity, ActivityAction, ActivityChanges, ActivityId, PersistedActivityData,
        TaskSnapshot,
    },
    ports::{
        ActivityEntry, ActivityFilter, ActivityRepository, ActivityRepositoryError,
        ActivityRepositoryResult, Visibility,
    },
};
use crate::persistence::{BlockingFailure, PgPool, run_blocking};
use crate::task::domain::TaskId;
use crate::user::domain::UserId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text, Uuid};

/// Columns shared by every entry query.
const ENTRY_COLUMNS: &str = "SELECT a.id, a.task_id, a.user_id, a.action, a.description, \
     a.changes, a.snapshot, a.timestamp, t.title AS live_title \
     FROM activities a LEFT JOIN tasks t ON t.id = a.task_id";

/// Visibility predicate over `$1` (the viewer, `NULL` for everyone).
const VISIBLE: &str = "($1::uuid IS NULL \
     OR a.user_id = $1 \
     OR a.snapshot->>'assigned_user_id' = $1::text \
     OR a.snapshot->'assigned_user_ids' @> jsonb_build_array($1::text) \
     OR EXISTS (SELECT 1 FROM task_assignees ta WHERE ta.task_id = a.task_id AND ta.user_id = $1))";

/// Filter predicates over `$2` to `$5`.
const FILTERED: &str = "($2::uuid IS NULL OR a.snapshot->>'task_id' = $2::text) \
     AND ($3::uuid IS NULL OR a.user_id = $3) \
     AND ($4::text IS NULL OR a.action = $4) \
     AND ($5::text IS NULL OR a.description ILIKE $5 ESCAPE '\\' \
          OR COALESCE(t.title, a.snapshot->>'task_title') ILIKE $5 ESCAPE '\\')";

const NEWEST_FIRST: &str = "ORDER BY a.timestamp DESC, a.seq DESC";

/// `PostgreSQL`-backed activity repository.
#[derive(Debug, Clone)]
pub struct PostgresActivityRepository {
    pool: PgPool,
}

impl PostgresActivityRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run<F, T>(&self, f: F) -> ActivityRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ActivityRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(&self.pool, blocking_failure, f).await
    }
}

fn blocking_failure(err: BlockingFailure) -> ActivityRepositoryError {
    ActivityRepositoryError::persistence(err)
}

/// Bind values for the shared predicates.
#[derive(Debug, Clone)]
struct QueryBinds {
    viewer: Option<uuid::Uuid>,
    task: Option<uuid::Uuid>,
    user: Option<uuid::Uuid>,
    action: Option<String>,
    search: Option<String>,
}

impl QueryBinds {
    fn new(visibility: Visibility, filter: &ActivityFilter) -> Self {
        Self {
            viewer: viewer(visibility),
            task: filter.task.map(TaskId::into_inner),
            user: filter.user.map(UserId::into_inner),
            action: filter.action.map(|action| action.as_str().to_owned()),
            search: filter.search.as_deref().map(like_pattern),
        }
    }
}

fn viewer(visibility: Visibility) -> Option<uuid::Uuid> {
    match visibility {
        Visibility::All => None,
        Visibility::Member(user_id) => Some(user_id.into_inner()),
    }
}

/// Wraps a search term for `ILIKE`, escaping its wildcards.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[async_trait]
impl ActivityRepository for PostgresActivityRepository {
    async fn count(
        &self,
        visibility: Visibility,
        filter: &ActivityFilter,
    ) -> ActivityRepositoryResult<u64> {
        let binds = QueryBinds::new(visibility, filter);
        self.run(move |connection| {
            let sql = format!(
                "SELECT COUNT(*) AS count FROM activities a \
                 LEFT JOIN tasks t ON t.id = a.task_id WHERE {VISIBLE} AND {FILTERED}"
            );
            let row = diesel::sql_query(sql)
                .bind::<Nullable<Uuid>, _>(binds.viewer)
                .bind::<Nullable<Uuid>, _>(binds.task)
                .bind::<Nullable<Uuid>, _>(binds.user)
                .bind::<Nullable<Text>, _>(binds.action)
                .bind::<Nullable<Text>, _>(binds.search)
                .get_result::<CountRow>(connection)
                .map_err(ActivityRepositoryError::persistence)?;
            Ok(to_u64(row.count))
        })
        .await
    }

    async fn find_page(
        &self,
        visibility: Visibility,
        filter: &ActivityFilter,
        offset: u64,
        limit: u64,
    ) -> ActivityRepositoryResult<Vec<ActivityEntry>> {
        let binds = QueryBinds::new(visibility, filter);
        self.run(move |connection| {
            let sql = format!(
                "{ENTRY_COLUMNS} WHERE {VISIBLE} AND {FILTERED} {NEWEST_FIRST} \
                 OFFSET $6 LIMIT $7"
            );
            diesel::sql_query(sql)
                .bind::<Nullable<Uuid>, _>(binds.viewer)
                .bind::<Nullable<Uuid>, _>(binds.task)
                .bind::<Nullable<Uuid>, _>(binds.user)
                .bind::<Nullable<Text>, _>(binds.action)
                .bind::<Nullable<Text>, _>(binds.search)
                .bind::<BigInt, _>(to_i64(offset))
                .bind::<BigInt, _>(to_i64(limit))
                .load::<ActivityEntryRow>(connection)
                .map_err(ActivityRepositoryError::persistence)?
                .into_iter()
                .map(row_to_entry)
                .collect()
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: ActivityId,
        visibility: Visibility,
    ) -> ActivityRepositoryResult<Option<ActivityEntry>> {
        let viewer_id = viewer(visibility);
        self.run(move |connection| {
            let sql = format!("{ENTRY_COLUMNS} WHERE {VISIBLE} AND a.id = $2");
            let row = diesel::sql_query(sql)
                .bind::<Nullable<Uuid>, _>(viewer_id)
                .bind::<Uuid, _>(id.into_inner())
                .get_result::<ActivityEntryRow>(connection)
                .optional()
                .map_err(ActivityRepositoryError::persistence)?;
            row.map(row_to_entry).transpose()
        })
        .await
    }

    async fn count_by_action(
        &self,
        visibility: Visibility,
    ) -> ActivityRepositoryResult<Vec<(ActivityAction, u64)>> {
        let viewer_id = viewer(visibility);
        self.run(move |connection| {
            let sql = format!(
                "SELECT a.action, COUNT(*) AS count FROM activities a \
                 WHERE {VISIBLE} GROUP BY a.action ORDER BY a.action"
            );
            diesel::sql_query(sql)
                .bind::<Nullable<Uuid>, _>(viewer_id)
                .load::<ActionCountRow>(connection)
                .map_err(ActivityRepositoryError::persistence)?
                .into_iter()
                .map(|row| {
                    let action = ActivityAction::try_from(row.action.as_str())
                        .map_err(ActivityRepositoryError::persistence)?;
                    Ok((action, to_u64(row.count)))
                })
                .collect()
        })
        .await
    }
}

/// Appends an activity using the caller's connection, so it joins the
/// caller's open transaction.
pub(crate) fn insert_activity(
    connection: &mut PgConnection,
    activity: &Activity,
) -> ActivityRepositoryResult<()> {
    let row = to_new_row(activity)?;
    diesel::insert_into(activities::table)
        .values(&row)
        .execute(connection)
        .map_err(ActivityRepositoryError::persistence)?;
    Ok(())
}

pub(crate) fn to_new_row(activity: &Activity) -> ActivityRepositoryResult<NewActivityRow> {
    let snapshot =
        serde_json::to_value(activity.snapshot()).map_err(ActivityRepositoryError::persistence)?;
    Ok(NewActivityRow {
        id: activity.id().into_inner(),
        task_id: activity.task().map(TaskId::into_inner),
        user_id: activity.user().map(UserId::into_inner),
        action: activity.action().as_str().to_owned(),
        description: activity.description().to_owned(),
        changes: activity.changes().map(ActivityChanges::to_json),
        snapshot,
        timestamp: activity.timestamp(),
    })
}

pub(crate) fn row_to_entry(row: ActivityEntryRow) -> ActivityRepositoryResult<ActivityEntry> {
    let ActivityEntryRow {
        id,
        task_id,
        user_id,
        action,
        description,
        changes,
        snapshot,
        timestamp,
        live_title,
    } = row;

    let data = PersistedActivityData {
        id: ActivityId::from_uuid(id),
        task: task_id.map(TaskId::from_uuid),
        user: user_id.map(UserId::from_uuid),
        action: ActivityAction::try_from(action.as_str())
            .map_err(ActivityRepositoryError::persistence)?,
        description,
        changes: changes.and_then(ActivityChanges::from_json),
        snapshot: serde_json::from_value::<TaskSnapshot>(snapshot)
            .map_err(ActivityRepositoryError::persistence)?,
        timestamp,
    };
    let activity = Activity::from_persisted(data);
    let task_info = activity.task_info(live_title.as_deref());
    Ok(ActivityEntry {
        activity,
        task_info,
    })
}
