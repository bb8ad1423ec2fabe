//! Task endpoints.

use super::{ApiError, AppState, Backend, RequestContext};
use crate::task::{
    domain::{Task, TaskId},
    services::{CreateTaskRequest, UpdateTaskRequest},
};
use crate::user::domain::UserId;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Body of `POST /tasks`.
#[derive(Debug, Deserialize)]
pub(super) struct CreateTaskBody {
    title: String,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    #[serde(default)]
    assignees: Vec<UserId>,
    deadline: Option<NaiveDate>,
}

impl From<CreateTaskBody> for CreateTaskRequest {
    fn from(body: CreateTaskBody) -> Self {
        let mut request = Self::new(body.title).with_assignees(body.assignees);
        if let Some(description) = body.description {
            request = request.with_description(description);
        }
        if let Some(status) = body.status {
            request = request.with_status(status);
        }
        if let Some(priority) = body.priority {
            request = request.with_priority(priority);
        }
        if let Some(deadline) = body.deadline {
            request = request.with_deadline(deadline);
        }
        request
    }
}

/// Body of `PUT /tasks/{id}`: every field is replaced, a missing deadline
/// clears it.
#[derive(Debug, Deserialize)]
pub(super) struct ReplaceTaskBody {
    title: String,
    #[serde(default)]
    description: String,
    status: Option<String>,
    priority: Option<String>,
    deadline: Option<NaiveDate>,
}

impl From<ReplaceTaskBody> for UpdateTaskRequest {
    fn from(body: ReplaceTaskBody) -> Self {
        let mut request = Self::new()
            .with_title(body.title)
            .with_description(body.description)
            .with_deadline(body.deadline);
        if let Some(status) = body.status {
            request = request.with_status(status);
        }
        if let Some(priority) = body.priority {
            request = request.with_priority(priority);
        }
        request
    }
}

/// Body of `PATCH /tasks/{id}`: absent fields are left unchanged, an
/// explicit `"deadline": null` clears the deadline.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct EditTaskBody {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    #[serde(deserialize_with = "present")]
    deadline: Option<Option<NaiveDate>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NaiveDate>::deserialize(deserializer).map(Some)
}

impl From<EditTaskBody> for UpdateTaskRequest {
    fn from(body: EditTaskBody) -> Self {
        let mut request = Self::new();
        if let Some(title) = body.title {
            request = request.with_title(title);
        }
        if let Some(description) = body.description {
            request = request.with_description(description);
        }
        if let Some(status) = body.status {
            request = request.with_status(status);
        }
        if let Some(priority) = body.priority {
            request = request.with_priority(priority);
        }
        if let Some(deadline) = body.deadline {
            request = request.with_deadline(deadline);
        }
        request
    }
}

/// Body of `PATCH /tasks/{id}/status`.
#[derive(Debug, Deserialize)]
pub(super) struct StatusBody {
    status: Option<String>,
}

/// Body of the assignee endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct AssigneesBody {
    users: Vec<UserId>,
}

fn task_id(path: Result<Path<Uuid>, PathRejection>) -> Result<TaskId, ApiError> {
    let Path(id) = path?;
    Ok(TaskId::from_uuid(id))
}

pub(super) async fn list_tasks<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.tasks.list(&context).await?))
}

pub(super) async fn create_task<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    body: Result<Json<CreateTaskBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(payload) = body?;
    let task = state.tasks.create(&context, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub(super) async fn get_task<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(state.tasks.get(&context, task_id(path)?).await?))
}

pub(super) async fn replace_task<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<ReplaceTaskBody>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = task_id(path)?;
    let Json(payload) = body?;
    Ok(Json(state.tasks.update(&context, id, payload.into()).await?))
}

pub(super) async fn edit_task<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<EditTaskBody>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = task_id(path)?;
    let Json(payload) = body?;
    Ok(Json(state.tasks.update(&context, id, payload.into()).await?))
}

pub(super) async fn update_status<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<StatusBody>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = task_id(path)?;
    let Json(payload) = body?;
    let status = payload
        .status
        .ok_or_else(|| ApiError::bad_request("Status field is required."))?;
    Ok(Json(state.tasks.update_status(&context, id, &status).await?))
}

pub(super) async fn delete_task<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    state.tasks.delete(&context, task_id(path)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn assign<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<AssigneesBody>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = task_id(path)?;
    let Json(payload) = body?;
    Ok(Json(state.tasks.assign(&context, id, &payload.users).await?))
}

pub(super) async fn unassign<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<AssigneesBody>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = task_id(path)?;
    let Json(payload) = body?;
    Ok(Json(state.tasks.unassign(&context, id, &payload.users).await?))
}
