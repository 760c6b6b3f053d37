//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors
//! to Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! The taxonomy follows the access-control contract: authentication
//! failures are 401, authorization failures 403, missing entities 404,
//! malformed input 400, and persistence failures a generic 400 whose
//! detail is only logged server-side. No failure is retried.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type for the marketplace API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Credential missing, undecodable, or resolving to no user.
    #[error("Unauthorized: {0}")]
    Auth(String),

    /// Role or ownership mismatch.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Entity lookup by id came up empty.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input.
    #[error("Bad request: {0}")]
    Validation(String),

    /// Underlying store failure.
    #[error("Database error: {0}")]
    Repository(RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry; clients only ever see
        // the generic message for these.
        if matches!(self, Self::Repository(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            // Persistence failures deliberately surface as a 400 with a
            // generic body; the detail stays server-side.
            Self::Validation(_) | Self::Repository(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let detail = match &self {
            Self::Repository(_) => "Something went wrong. Please try again later".to_owned(),
            Self::Internal(_) => "Internal server error".to_owned(),
            Self::Auth(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Validation(msg) => msg.clone(),
        };

        let mut response = (status, Json(ErrorBody { detail })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            // Unique-constraint conflicts carry a user-facing message.
            RepositoryError::Conflict(msg) => Self::Validation(msg),
            RepositoryError::NotFound => Self::NotFound("Not found".to_owned()),
            other => Self::Repository(other),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            get_status(AppError::Auth("bad token".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("not yours".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::NotFound("Product not found".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Validation("Original price cannot be 0".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Repository(RepositoryError::DataCorruption(
                "boom".to_owned()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = AppError::Auth("Not authenticated".to_owned()).into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_conflict_surfaces_its_message() {
        let err: AppError =
            RepositoryError::Conflict("Username already exists".to_owned()).into();
        assert!(matches!(&err, AppError::Validation(msg) if msg == "Username already exists"));
    }

    #[test]
    fn test_database_errors_are_generic() {
        let err: AppError = RepositoryError::DataCorruption("detail".to_owned()).into();
        assert!(matches!(err, AppError::Repository(_)));
    }
}
