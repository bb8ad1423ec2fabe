//! Read-only audit trail endpoints.
//!
//! Write verbs are routed too, so that callers get the immutability error
//! rather than a 405.

use super::{ApiError, AppState, Backend, RequestContext, UserResponse};
use crate::activity::{
    domain::{ActivityAction, ActivityChanges, ActivityId, TaskInfo},
    ports::ActivityFilter,
    services::{ActivityStats, ActivityView},
};
use crate::pagination::{Page, PageRequest};
use crate::task::domain::TaskId;
use crate::user::domain::UserId;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One activity as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(super) struct ActivityResponse {
    id: ActivityId,
    user: Option<UserResponse>,
    action: ActivityAction,
    description: String,
    timestamp: DateTime<Utc>,
    changes: Option<ActivityChanges>,
    task_info: TaskInfo,
}

impl From<ActivityView> for ActivityResponse {
    fn from(view: ActivityView) -> Self {
        let ActivityView { entry, actor } = view;
        let activity = entry.activity;
        Self {
            id: activity.id(),
            user: actor.as_ref().map(UserResponse::from),
            action: activity.action(),
            description: activity.description().to_owned(),
            timestamp: activity.timestamp(),
            changes: activity.changes().cloned(),
            task_info: entry.task_info,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct StatsResponse {
    total: u64,
    by_action: BTreeMap<&'static str, u64>,
    recent: Vec<ActivityResponse>,
}

impl From<ActivityStats> for StatsResponse {
    fn from(stats: ActivityStats) -> Self {
        Self {
            total: stats.total,
            by_action: stats
                .by_action
                .into_iter()
                .map(|(action, count)| (action.as_str(), count))
                .collect(),
            recent: stats.recent.into_iter().map(ActivityResponse::from).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PageQuery {
    page: Option<i64>,
    page_size: Option<i64>,
}

impl PageQuery {
    fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ListQuery {
    page: Option<i64>,
    page_size: Option<i64>,
    task: Option<Uuid>,
    user: Option<Uuid>,
    action: Option<String>,
    search: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> Result<ActivityFilter, ApiError> {
        let mut filter = ActivityFilter::default();
        if let Some(task) = self.task {
            filter = filter.for_task(TaskId::from_uuid(task));
        }
        if let Some(user) = self.user {
            filter = filter.by_user(UserId::from_uuid(user));
        }
        if let Some(action) = self.action.as_deref().filter(|raw| !raw.trim().is_empty()) {
            let parsed = ActivityAction::try_from(action)
                .map_err(|err| ApiError::bad_request(err.to_string()))?;
            filter = filter.with_action(parsed);
        }
        if let Some(search) = &self.search {
            filter = filter.with_search(search);
        }
        Ok(filter)
    }
}

fn path_uuid(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    let Path(id) = path?;
    Ok(id)
}

fn to_page(page: Page<ActivityView>) -> Json<Page<ActivityResponse>> {
    Json(page.map(ActivityResponse::from))
}

pub(super) async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Page<ActivityResponse>>, ApiError> {
    let Query(params) = query?;
    let filter = params.filter()?;
    let request = PageRequest::new(params.page, params.page_size);
    Ok(to_page(state.activities.list(&context, &filter, request).await?))
}

pub(super) async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let id = ActivityId::from_uuid(path_uuid(path)?);
    let view = state.activities.get(&context, id).await?;
    Ok(Json(ActivityResponse::from(view)))
}

pub(super) async fn by_task<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Page<ActivityResponse>>, ApiError> {
    let id = TaskId::from_uuid(path_uuid(path)?);
    let Query(params) = query?;
    Ok(to_page(
        state.activities.by_task(&context, id, params.request()).await?,
    ))
}

pub(super) async fn by_user<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Page<ActivityResponse>>, ApiError> {
    let id = UserId::from_uuid(path_uuid(path)?);
    let Query(params) = query?;
    Ok(to_page(
        state.activities.by_user(&context, id, params.request()).await?,
    ))
}

pub(super) async fn recent<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
) -> Result<Json<Vec<ActivityResponse>>, ApiError> {
    let views = state.activities.recent(&context).await?;
    Ok(Json(views.into_iter().map(ActivityResponse::from).collect()))
}

pub(super) async fn stats<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
) -> Result<Json<StatsResponse>, ApiError> {
    let summary = state.activities.stats(&context).await?;
    Ok(Json(StatsResponse::from(summary)))
}

pub(super) async fn reject_create<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
) -> Result<(), ApiError> {
    Ok(state.activities.create(&context)?)
}

pub(super) async fn reject_update<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<(), ApiError> {
    let id = ActivityId::from_uuid(path_uuid(path)?);
    Ok(state.activities.update(&context, id)?)
}

pub(super) async fn reject_delete<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<(), ApiError> {
    let id = ActivityId::from_uuid(path_uuid(path)?);
    Ok(state.activities.delete(&context, id)?)
}
