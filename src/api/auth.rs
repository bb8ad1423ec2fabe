//! Request authentication.
//!
//! The gateway in front of the service authenticates callers and forwards
//! the user id in [`USER_ID_HEADER`]. The extractor resolves it into an
//! [`ActorContext`] that lives exactly as long as the request.

use super::{ApiError, AppState, Backend};
use crate::context::ActorContext;
use crate::user::domain::UserId;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;
use uuid::Uuid;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying an optional correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const INVALID_CREDENTIALS: &str = "Invalid authentication credentials.";

/// Authenticated request context.
#[derive(Debug, Clone)]
pub struct RequestContext(pub ActorContext);

fn header_uuid(parts: &Parts, name: &str) -> Option<Result<Uuid, uuid::Error>> {
    parts
        .headers
        .get(name)
        .map(|value| Uuid::parse_str(value.to_str().unwrap_or_default().trim()))
}

impl<B: Backend> FromRequestParts<AppState<B>> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<B>,
    ) -> Result<Self, Self::Rejection> {
        let correlation_id = header_uuid(parts, REQUEST_ID_HEADER)
            .and_then(Result::ok)
            .unwrap_or_else(Uuid::new_v4);
        let user_id = match header_uuid(parts, USER_ID_HEADER) {
            None => return Err(ApiError::unauthorized(MISSING_CREDENTIALS)),
            Some(Err(_)) => return Err(ApiError::unauthorized(INVALID_CREDENTIALS)),
            Some(Ok(uuid)) => UserId::from_uuid(uuid),
        };

        let actor = state
            .accounts
            .resolve_actor(user_id)
            .await?
            .ok_or_else(|| {
                debug!(event = "auth.unknown_user", user_id = %user_id, "Rejected unknown user");
                ApiError::unauthorized(INVALID_CREDENTIALS)
            })?;

        Ok(Self(
            ActorContext::empty()
                .with_actor(actor)
                .with_correlation_id(correlation_id),
        ))
    }
}
