/// User account and session endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/users/register` - Create an account
/// - `POST /api/v1/users/login` - Authenticate, receive a token pair
/// - `POST /api/v1/users/logout` - Revoke the live session (protected)
/// - `POST /api/v1/users/refresh-token` - Rotate the token pair
/// - `POST /api/v1/users/change-password` - Change password (protected)
/// - `GET  /api/v1/users/me` - Current caller identity (protected)
/// - `GET  /api/v1/users/history` - Watch history (protected)
///
/// Login and refresh deliver the tokens twice: in the JSON body for API
/// clients and as HttpOnly cookies for browsers.
use axum::{extract::State, http::HeaderMap, Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;
use vidstream_shared::{
    models::{channel::WatchedVideo, user::PublicUser},
    session::RegisterInput,
};

use crate::{
    app::AppState,
    cookies::{self, REFRESH_COOKIE},
    error::ApiResult,
    middleware::auth_gate::CurrentUser,
    response::ApiResponse,
};

/// Register request body.
///
/// Media URLs reference blobs already uploaded to the external store. The
/// avatar is mandatory at registration, the cover image is not.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Requested username
    #[validate(length(max = 64, message = "must be at most 64 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "is not a valid email address"))]
    pub email: String,

    /// Display name
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub full_name: String,

    /// Plaintext password, hashed server-side
    pub password: String,

    /// Avatar URL
    #[validate(
        required(message = "is required"),
        length(min = 1, max = 512, message = "must be between 1 and 512 characters")
    )]
    pub avatar_url: Option<String>,

    /// Cover image URL
    #[validate(length(max = 512, message = "must be at most 512 characters"))]
    pub cover_image_url: Option<String>,
}

/// Login request body; at least one of username/email is required
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username to log in with
    pub username: Option<String>,

    /// Email to log in with
    pub email: Option<String>,

    /// Plaintext password
    pub password: String,
}

/// Login/refresh response data
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    /// The authenticated user, sanitized
    pub user: PublicUser,

    /// Short-lived access token
    pub access_token: String,

    /// Long-lived refresh token
    pub refresh_token: String,
}

/// Refresh request body; the cookie takes precedence when both are present
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Refresh token, for clients that do not use cookies
    pub refresh_token: Option<String>,
}

/// Change-password request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password
    pub old_password: String,

    /// Replacement password
    pub new_password: String,
}

/// Registers a new user.
///
/// # Errors
///
/// - `400 Bad Request`: blank or malformed fields
/// - `409 Conflict`: username or email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<ApiResponse<PublicUser>> {
    req.validate()?;

    let user = state
        .sessions
        .register(RegisterInput {
            username: req.username,
            email: req.email,
            full_name: req.full_name,
            password: req.password,
            avatar_url: req.avatar_url,
            cover_image_url: req.cover_image_url,
        })
        .await?;

    Ok(ApiResponse::created("User registered", user))
}

/// Logs a user in and opens a session.
///
/// # Errors
///
/// - `400 Bad Request`: neither username nor email given
/// - `404 Not Found`: no such user
/// - `401 Unauthorized`: wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(HeaderMap, ApiResponse<SessionData>)> {
    let identifier = req.username.or(req.email).unwrap_or_default();

    let session = state.sessions.login(&identifier, &req.password).await?;

    let mut headers = HeaderMap::new();
    cookies::set_token_cookies(&mut headers, &session.tokens);

    Ok((
        headers,
        ApiResponse::ok(
            "Login successful",
            SessionData {
                user: session.user,
                access_token: session.tokens.access_token,
                refresh_token: session.tokens.refresh_token,
            },
        ),
    ))
}

/// Logs the caller out, clearing the persisted refresh token and both
/// cookies. Safe to call repeatedly.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<(HeaderMap, ApiResponse<()>)> {
    state.sessions.logout(current.0.id).await?;

    let mut headers = HeaderMap::new();
    cookies::clear_token_cookies(&mut headers);

    Ok((headers, ApiResponse::ok("Logged out", ())))
}

/// Exchanges a refresh token (cookie or body) for a new pair.
///
/// # Errors
///
/// - `401 Unauthorized`: token missing, invalid, expired, or superseded
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<(HeaderMap, ApiResponse<SessionData>)> {
    let presented = cookies::parse_cookie(&headers, REFRESH_COOKIE)
        .or_else(|| body.and_then(|Json(b)| b.refresh_token));

    let session = state.sessions.refresh(presented.as_deref()).await?;

    let mut headers = HeaderMap::new();
    cookies::set_token_cookies(&mut headers, &session.tokens);

    Ok((
        headers,
        ApiResponse::ok(
            "Token refreshed",
            SessionData {
                user: session.user,
                access_token: session.tokens.access_token,
                refresh_token: session.tokens.refresh_token,
            },
        ),
    ))
}

/// Changes the caller's password.
///
/// # Errors
///
/// - `400 Bad Request`: wrong old password or blank new password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<ApiResponse<()>> {
    state
        .sessions
        .change_password(current.0.id, &req.old_password, &req.new_password)
        .await?;

    Ok(ApiResponse::ok("Password changed", ()))
}

/// Returns the caller's own sanitized record
pub async fn me(Extension(current): Extension<CurrentUser>) -> ApiResult<ApiResponse<PublicUser>> {
    Ok(ApiResponse::ok("Current user", current.0))
}

/// Returns the caller's watch history, most recent first
pub async fn watch_history(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<ApiResponse<Vec<WatchedVideo>>> {
    let history = state.store.watch_history(current.0.id).await?;
    Ok(ApiResponse::ok("Watch history", history))
}
