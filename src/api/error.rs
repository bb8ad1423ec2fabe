//! HTTP error envelope.
//!
//! Service errors are converted here, once, into a status code and a
//! `{"detail": "..."}` body. Persistence failures are logged and reported
//! with a generic message.

use crate::activity::services::ActivityQueryError;
use crate::task::services::TaskServiceError;
use crate::user::services::AccountError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

const INTERNAL_DETAIL: &str = "A server error occurred.";

/// Error returned by every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl ApiError {
    /// 400 with `detail`.
    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    /// 401 with `detail`.
    #[must_use]
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }

    /// 403 with `detail`.
    #[must_use]
    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, detail)
    }

    /// 404 with `detail`.
    #[must_use]
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    /// 500 with a generic detail; `source` is logged, not returned.
    #[must_use]
    pub fn internal(source: &dyn std::error::Error) -> Self {
        error!(event = "api.internal_error", error = %source, "Request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_DETAIL)
    }

    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the client-facing detail message.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                detail: &self.detail,
            }),
        )
            .into_response()
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match &err {
            TaskServiceError::Validation(_) | TaskServiceError::UserNotFound(_) => {
                Self::bad_request(err.to_string())
            }
            TaskServiceError::Unauthenticated(_) => Self::unauthorized(err.to_string()),
            TaskServiceError::Forbidden(message) => Self::forbidden(*message),
            TaskServiceError::NotFound(_) => Self::not_found(err.to_string()),
            TaskServiceError::Store(_) | TaskServiceError::Users(_) => Self::internal(&err),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match &err {
            AccountError::Domain(_) | AccountError::EmailTaken => {
                Self::bad_request(err.to_string())
            }
            AccountError::Unauthenticated(_) => Self::unauthorized(err.to_string()),
            AccountError::Forbidden(message) => Self::forbidden(*message),
            AccountError::NotFound(_) => Self::not_found(err.to_string()),
            AccountError::Repository(_) => Self::internal(&err),
        }
    }
}

impl From<ActivityQueryError> for ApiError {
    fn from(err: ActivityQueryError) -> Self {
        match &err {
            ActivityQueryError::RecordImmutable => Self::bad_request(err.to_string()),
            ActivityQueryError::Unauthenticated(_) => Self::unauthorized(err.to_string()),
            ActivityQueryError::NotFound(_) => Self::not_found(err.to_string()),
            ActivityQueryError::Repository(_) | ActivityQueryError::Users(_) => {
                Self::internal(&err)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::not_found(rejection.body_text())
    }
}
