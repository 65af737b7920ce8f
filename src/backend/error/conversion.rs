/**
 * Error Conversion
 *
 * This module provides the single serialization contract for backend errors:
 * every `ApiError` leaving a handler becomes a JSON response of the shape
 *
 * ```json
 * {
 *   "error": "community not found",
 *   "status": 404
 * }
 * ```
 *
 * Handlers never build error bodies themselves, and stack traces are never
 * part of a response.
 */

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::backend::error::types::ApiError;

impl IntoResponse for ApiError {
    /// Convert a backend error into an HTTP response
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if let ApiError::Database(ref err) = self {
            tracing::error!("[Error] Database failure: {:?}", err);
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap_or_else(
                |_| format!(r#"{{"error":"{}","status":{}}}"#, message, status.as_u16()),
            )))
            .unwrap_or_else(|_| {
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Body::from("Internal Server Error"))
                    .unwrap()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_response_status() {
        let response = ApiError::NotFound("post").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_into_response_content_type() {
        let response = ApiError::validation("title is required").into_response();
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }
}
