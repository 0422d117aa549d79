//! JSON response envelopes and the transport error type.
//!
//! # Invariants
//! - Every response body is either `{code, message, data}` or
//!   `{code, message, errors}`; `code` always equals the HTTP status.
//! - `errors` is `null` unless it carries field validation details.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Envelope for successful responses.
#[derive(Debug, Serialize)]
pub struct ResponseSuccess<T> {
    pub code: u16,
    pub message: String,
    pub data: T,
}

/// Envelope for failed responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    pub code: u16,
    pub message: String,
    pub errors: Option<Vec<FieldError>>,
}

/// One failed request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "This field is required")
    }
}

/// Builds a success envelope response.
pub fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (
        status,
        Json(ResponseSuccess {
            code: status.as_u16(),
            message: message.to_string(),
            data,
        }),
    )
        .into_response()
}

/// Transport-level failure rendered as an error envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    errors: Option<Vec<FieldError>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Generic 500; callers log the cause and never pass internals here.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 422 with per-field details.
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "validation error".to_string(),
            errors: Some(errors),
        }
    }

    /// Rejection of a non-numeric `{id}` path segment.
    pub fn invalid_id() -> Self {
        Self::bad_request("ID must be a valid number")
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ResponseError {
                code: self.status.as_u16(),
                message: self.message,
                errors: self.errors,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, FieldError};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::{json, Value};

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn error_envelope_code_matches_status() {
        let (status, body) = render(ApiError::not_found("missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"code": 404, "message": "missing", "errors": null})
        );
    }

    #[tokio::test]
    async fn validation_envelope_lists_fields() {
        let (status, body) = render(ApiError::validation(vec![FieldError::required("title")])).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "validation error");
        assert_eq!(
            body["errors"],
            json!([{"field": "title", "message": "This field is required"}])
        );
    }
}
