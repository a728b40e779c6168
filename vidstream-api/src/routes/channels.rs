/// Channel profile endpoint
///
/// ```text
/// GET /api/v1/channels/:username
/// ```
///
/// A read model computed by the credential store: profile fields plus
/// subscriber/subscribed-to counts and whether the caller subscribes.
use axum::{
    extract::{Path, State},
    Extension,
};
use vidstream_shared::models::channel::ChannelProfile;

use crate::{
    app::AppState, error::ApiError, error::ApiResult, middleware::auth_gate::CurrentUser,
    response::ApiResponse,
};

/// Channel profile handler.
///
/// # Errors
///
/// - `404 Not Found`: no channel with that username
pub async fn channel_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> ApiResult<ApiResponse<ChannelProfile>> {
    let username = username.trim().to_lowercase();

    let profile = state
        .store
        .channel_profile(&username, Some(current.0.id))
        .await?
        .ok_or_else(|| ApiError::NotFound("channel does not exist".to_string()))?;

    Ok(ApiResponse::ok("Channel profile", profile))
}
