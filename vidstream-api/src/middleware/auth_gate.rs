/// The auth gate for protected routes
///
/// Extracts the bearer credential, preferring the `accessToken` cookie and
/// falling back to an `Authorization: Bearer <token>` header, validates it
/// against the access secret, then resolves the caller through the
/// credential store. Resolution is the one store round-trip in the request
/// path; it also catches tokens for accounts deleted after issuance.
///
/// On success a [`CurrentUser`] is inserted into request extensions for
/// downstream handlers:
///
/// ```no_run
/// use axum::Extension;
/// use vidstream_api::middleware::auth_gate::CurrentUser;
///
/// async fn handler(Extension(current): Extension<CurrentUser>) -> String {
///     format!("Hello, {}", current.0.username)
/// }
/// ```
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use vidstream_shared::{auth::tokens::TokenError, models::user::PublicUser};

use crate::{
    app::AppState,
    cookies::{parse_cookie, ACCESS_COOKIE},
    error::ApiError,
};

/// The resolved caller identity, password and refresh token projected out.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub PublicUser);

/// Middleware guarding protected routes.
///
/// # Errors
///
/// Responds 401 when the credential is missing, fails validation, has
/// expired, or names a user that no longer exists.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = parse_cookie(req.headers(), ACCESS_COOKIE)
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::to_string)
        })
        .ok_or_else(|| ApiError::Unauthorized("Missing access token".to_string()))?;

    let claims = state
        .sessions
        .issuer()
        .verify_access_token(&token)
        .map_err(|e| match e {
            TokenError::Expired => ApiError::Unauthorized("Access token has expired".to_string()),
            _ => ApiError::Unauthorized("Access token is invalid".to_string()),
        })?;

    let user = state
        .store
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    req.extensions_mut().insert(CurrentUser(user.into_public()));

    Ok(next.run(req).await)
}
