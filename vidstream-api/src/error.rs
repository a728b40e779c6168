/// Error handling for the API server
///
/// Every handler returns `Result<T, ApiError>`. The error converts into the
/// uniform envelope `{success: false, statusCode, message}`; anything
/// unrecognized is logged and surfaced as a generic 500 without leaking
/// internals.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use vidstream_shared::{session::SessionError, store::StoreError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - duplicate username or email
    Conflict(String),

    /// Internal server error (500)
    InternalError(String),
}

/// The failure envelope sent to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always false
    pub success: bool,

    /// HTTP status code, mirrored into the body
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    /// Human-readable error message
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorEnvelope {
            success: false,
            status_code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

/// Session lifecycle errors carry the taxonomy; map each variant to its
/// status code without inspecting messages.
impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Validation(msg) => ApiError::BadRequest(msg),
            SessionError::Conflict(_) => ApiError::Conflict(err.to_string()),
            SessionError::NotFound(msg) => ApiError::NotFound(msg),
            SessionError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            SessionError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            SessionError::TokenExpired => {
                ApiError::Unauthorized("Refresh token has expired".to_string())
            }
            SessionError::TokenInvalid => {
                ApiError::Unauthorized("Refresh token is invalid".to_string())
            }
            SessionError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => {
                ApiError::Conflict(format!("{} is already registered", field))
            }
            StoreError::Backend(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Flattens validator derive output into one 400 message
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    let detail = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "is invalid".to_string());
                    format!("{}: {}", field, detail)
                })
            })
            .collect();
        messages.sort();
        ApiError::BadRequest(messages.join("; "))
    }
}
