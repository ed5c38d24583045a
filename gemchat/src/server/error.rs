//! API error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::session::SessionError;

/// Errors returned by the JSON API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Session(SessionError::NotFound(_)) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            Self::Session(SessionError::Busy(_)) => (StatusCode::CONFLICT, "SESSION_BUSY"),
            Self::Session(SessionError::EmptyInput) => (StatusCode::BAD_REQUEST, "EMPTY_MESSAGE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let id = Uuid::now_v7();
        let cases = [
            (SessionError::NotFound(id), StatusCode::NOT_FOUND),
            (SessionError::Busy(id), StatusCode::CONFLICT),
            (SessionError::EmptyInput, StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
        assert_eq!(
            ApiError::Internal("task panicked".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
