//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Success envelope: `{"data": ..., "message": ...}`.
///
/// Failures never pass through here; they are rendered by
/// `AppError`'s `IntoResponse`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// `200 OK` response.
    pub const fn ok(data: T) -> Self {
        Self {
            data,
            message: None,
            status: StatusCode::OK,
        }
    }

    /// `201 Created` response.
    pub const fn created(data: T) -> Self {
        Self {
            data,
            message: None,
            status: StatusCode::CREATED,
        }
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::ok(1).with_message("done")).unwrap_or_default();
        assert_eq!(body, json!({"data": 1, "message": "done"}));

        let body = serde_json::to_value(ApiResponse::created("x")).unwrap_or_default();
        assert_eq!(body, json!({"data": "x"}));
    }

    #[test]
    fn test_status() {
        assert_eq!(ApiResponse::ok(()).into_response().status(), StatusCode::OK);
        assert_eq!(
            ApiResponse::created(()).into_response().status(),
            StatusCode::CREATED
        );
    }
}
