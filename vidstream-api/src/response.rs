/// The success response envelope
///
/// Mirrors the failure envelope in [`crate::error`]: every successful
/// response body is `{success: true, statusCode, message, data}`.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Envelope wrapping all successful responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always true
    pub success: bool,

    /// HTTP status code, mirrored into the body
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    /// Short human-readable summary
    pub message: String,

    /// The payload
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps `data` with the given status and message
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            status_code: status.as_u16(),
            message: message.into(),
            data,
        }
    }

    /// 200 OK envelope
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, data)
    }

    /// 201 Created envelope
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, data)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
