/**
 * Backend Error Types
 *
 * This module defines the error taxonomy used by every HTTP handler.
 * Each variant maps to exactly one status code; the mapping lives here and
 * the serialization contract lives in `conversion.rs`, so a handler never
 * builds an error response by hand.
 *
 * # Taxonomy
 *
 * - `Validation` - malformed or missing input, shape mismatch (400)
 * - `Unauthenticated` - missing or invalid credential (401)
 * - `Forbidden` - non-author/non-admin mutation attempt (403)
 * - `NotFound` - missing community/post/comment/user (404)
 * - `Conflict` - uniqueness violation such as a taken username (409)
 * - `Upstream` - object store or push transport failure (502)
 * - `Database` - persistence failure (500)
 *
 * Validation and authorization errors are raised before any mutation.
 * Database errors are logged with detail but serialized with a generic
 * message; stack traces are never exposed.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// The error type returned by every handler and pipeline step
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input (e.g. empty title, unknown post shape)
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credential
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not allowed to perform the mutation
    #[error("{0}")]
    Forbidden(String),

    /// A referenced resource does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness constraint was violated
    #[error("{0}")]
    Conflict(String),

    /// An external collaborator (object store, push transport) failed
    #[error("upstream service error: {0}")]
    Upstream(String),

    /// Persistence failure
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an upstream error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-visible error message
    ///
    /// Database detail stays in the logs; the response carries a generic
    /// message for that variant.
    pub fn message(&self) -> String {
        match self {
            Self::Database(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<SharedError> for ApiError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::ValidationError { field, message } => {
                Self::Validation(format!("{field}: {message}"))
            }
            SharedError::SerializationError { message } => Self::Validation(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            ApiError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthenticated("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("not the author".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::NotFound("post").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Conflict("username taken".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::upstream("put failed").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_not_found_message() {
        let error = ApiError::NotFound("community");
        assert_eq!(error.message(), "community not found");
    }

    #[test]
    fn test_database_message_is_generic() {
        let error = ApiError::Database(sqlx::Error::RowNotFound);
        assert_eq!(error.message(), "internal server error");
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_shared_error() {
        let shared = SharedError::validation("title", "title is required");
        let api: ApiError = shared.into();
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        assert!(api.message().contains("title is required"));
    }
}
