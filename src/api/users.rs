//! Account endpoints.

use super::{ApiError, AppState, Backend, RequestContext};
use crate::user::{
    domain::{Role, User, UserId},
    services::SignupRequest,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// Public view of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    /// Account identifier.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Display name.
    pub username: String,
    /// Role.
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().as_str().to_owned(),
            username: user.username().as_str().to_owned(),
            role: user.role(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct SignupBody {
    email: String,
    username: String,
    password: String,
    role: Option<String>,
}

pub(super) async fn signup<B: Backend>(
    State(state): State<AppState<B>>,
    body: Result<Json<SignupBody>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(payload) = body?;
    let mut request = SignupRequest::new(payload.email, payload.username, payload.password);
    if let Some(role) = payload.role {
        let parsed =
            Role::try_from(role.as_str()).map_err(|err| ApiError::bad_request(err.to_string()))?;
        request = request.with_role(parsed);
    }
    let user = state.accounts.signup(request).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

pub(super) async fn profile<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.accounts.profile(&context).await?;
    Ok(Json(UserResponse::from(&user)))
}

pub(super) async fn list_users<B: Backend>(
    State(state): State<AppState<B>>,
    RequestContext(context): RequestContext,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.accounts.list_users(&context).await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}
