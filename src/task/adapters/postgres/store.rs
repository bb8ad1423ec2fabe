//! `PostgreSQL` task store built on Diesel transactions.

use super::{
    models::{AssigneeRow, NewTaskRow, TaskChangeset, TaskRow},
    schema::{task_assignees, tasks},
};
use crate::activity::adapters::postgres::insert_activity;
use crate::activity::domain::Activity;
use crate::persistence::{BlockingFailure, PgPool, run_blocking};
use crate::task::{
    domain::{PersistedTaskData, Task, TaskId, TaskPriority, TaskStatus, TaskTitle},
    ports::{TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction},
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::{BTreeSet, HashMap};

/// `PostgreSQL`-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: PgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(&self.pool, blocking_failure::<TaskStoreError>, f).await
    }
}

fn blocking_failure<E: From<TaskStoreError>>(err: BlockingFailure) -> E {
    E::from(TaskStoreError::persistence(err))
}

/// Keeps the caller's error apart from Diesel's inside a transaction.
enum TransactionFailure<E> {
    Work(E),
    Database(DieselError),
}

impl<E> From<DieselError> for TransactionFailure<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

struct PgTaskTransaction<'a> {
    connection: &'a mut PgConnection,
}

impl TaskTransaction for PgTaskTransaction<'_> {
    fn lock_task(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        let row = tasks::table
            .find(id.into_inner())
            .for_update()
            .select(TaskRow::as_select())
            .first::<TaskRow>(self.connection)
            .optional()
            .map_err(TaskStoreError::persistence)?;
        match row {
            Some(task_row) => {
                let mut tasks = rows_to_tasks(self.connection, vec![task_row])?;
                Ok(tasks.pop())
            }
            None => Ok(None),
        }
    }

    fn insert_task(&mut self, task: &Task) -> TaskStoreResult<()> {
        let task_id = task.id();
        diesel::insert_into(tasks::table)
            .values(&to_new_row(task))
            .execute(self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    TaskStoreError::DuplicateTask(task_id)
                }
                _ => TaskStoreError::persistence(err),
            })?;
        insert_assignees(self.connection, task)
    }

    fn save_task(&mut self, task: &Task) -> TaskStoreResult<()> {
        let updated = diesel::update(tasks::table.find(task.id().into_inner()))
            .set(&to_changeset(task))
            .execute(self.connection)
            .map_err(TaskStoreError::persistence)?;
        if updated == 0 {
            return Err(TaskStoreError::NotFound(task.id()));
        }
        diesel::delete(
            task_assignees::table.filter(task_assignees::task_id.eq(task.id().into_inner())),
        )
        .execute(self.connection)
        .map_err(TaskStoreError::persistence)?;
        insert_assignees(self.connection, task)
    }

    fn delete_task(&mut self, id: TaskId) -> TaskStoreResult<()> {
        // Assignee rows cascade; activity task references are set null.
        let deleted = diesel::delete(tasks::table.find(id.into_inner()))
            .execute(self.connection)
            .map_err(TaskStoreError::persistence)?;
        if deleted == 0 {
            return Err(TaskStoreError::NotFound(id));
        }
        Ok(())
    }

    fn insert_activity(&mut self, activity: &Activity) -> TaskStoreResult<()> {
        insert_activity(self.connection, activity).map_err(TaskStoreError::persistence)
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn transact<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static,
    {
        run_blocking(&self.pool, blocking_failure::<E>, move |connection| {
            connection
                .transaction::<T, TransactionFailure<E>, _>(|transaction_connection| {
                    let mut transaction = PgTaskTransaction {
                        connection: transaction_connection,
                    };
                    work(&mut transaction).map_err(TransactionFailure::Work)
                })
                .map_err(|failure| match failure {
                    TransactionFailure::Work(err) => err,
                    TransactionFailure::Database(err) => {
                        E::from(TaskStoreError::persistence(err))
                    }
                })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        self.run(move |connection| {
            let rows = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            Ok(rows_to_tasks(connection, rows)?.pop())
        })
        .await
    }

    async fn list_all(&self) -> TaskStoreResult<Vec<Task>> {
        self.run(|connection| {
            let rows = tasks::table
                .order((tasks::created_at.desc(), tasks::id.desc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows_to_tasks(connection, rows)
        })
        .await
    }

    async fn list_assigned_to(&self, user_id: UserId) -> TaskStoreResult<Vec<Task>> {
        self.run(move |connection| {
            let rows = tasks::table
                .inner_join(task_assignees::table)
                .filter(task_assignees::user_id.eq(user_id.into_inner()))
                .order((tasks::created_at.desc(), tasks::id.desc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows_to_tasks(connection, rows)
        })
        .await
    }
}

fn insert_assignees(connection: &mut PgConnection, task: &Task) -> TaskStoreResult<()> {
    let rows: Vec<AssigneeRow> = task
        .assignees()
        .iter()
        .map(|user_id| AssigneeRow {
            task_id: task.id().into_inner(),
            user_id: user_id.into_inner(),
        })
        .collect();
    if rows.is_empty() {
        return Ok(());
    }
    diesel::insert_into(task_assignees::table)
        .values(&rows)
        .execute(connection)
        .map_err(TaskStoreError::persistence)?;
    Ok(())
}

/// Loads assignees for `rows` in one query and rebuilds the aggregates,
/// preserving row order.
fn rows_to_tasks(connection: &mut PgConnection, rows: Vec<TaskRow>) -> TaskStoreResult<Vec<Task>> {
    let ids: Vec<uuid::Uuid> = rows.iter().map(|row| row.id).collect();
    let links = task_assignees::table
        .filter(task_assignees::task_id.eq_any(ids))
        .select(AssigneeRow::as_select())
        .load::<AssigneeRow>(connection)
        .map_err(TaskStoreError::persistence)?;

    let mut assignees: HashMap<uuid::Uuid, BTreeSet<UserId>> = HashMap::new();
    for link in links {
        assignees
            .entry(link.task_id)
            .or_default()
            .insert(UserId::from_uuid(link.user_id));
    }

    rows.into_iter()
        .map(|row| {
            let task_assignees = assignees.remove(&row.id).unwrap_or_default();
            row_to_task(row, task_assignees)
        })
        .collect()
}

pub(crate) fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().to_owned(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        created_by: task.created_by().map(UserId::into_inner),
        deadline: task.deadline(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn to_changeset(task: &Task) -> TaskChangeset {
    TaskChangeset {
        title: task.title().as_str().to_owned(),
        description: task.description().to_owned(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        deadline: task.deadline(),
        updated_at: task.updated_at(),
    }
}

pub(crate) fn row_to_task(row: TaskRow, assignees: BTreeSet<UserId>) -> TaskStoreResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        status,
        priority,
        created_by,
        deadline,
        created_at,
        updated_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        title: TaskTitle::new(title).map_err(TaskStoreError::persistence)?,
        description,
        status: TaskStatus::try_from(status.as_str()).map_err(TaskStoreError::persistence)?,
        priority: TaskPriority::try_from(priority.as_str())
            .map_err(TaskStoreError::persistence)?,
        assignees,
        created_by: created_by.map(UserId::from_uuid),
        deadline,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}
