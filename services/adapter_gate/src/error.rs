//! Errors the gate answers itself, outside the job envelope (unknown or
//! unconfigured adapter routes). Every such response is JSON:
//!
//! ```json
//! { "code": "not_found", "message": "adapter not found: myspace" }
//! ```
//!
//! Job failures never come through here; they are 500 error envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.status.as_u16(), self.code, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_body_shape() {
        let err = AppError::not_found("adapter not found: myspace");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "[404] not_found: adapter not found: myspace");
        let json = serde_json::to_value(ApiErrorBody {
            code: err.code,
            message: err.message,
        })
        .unwrap();
        assert_eq!(json["code"], "not_found");
        assert_eq!(json["message"], "adapter not found: myspace");
    }
}
