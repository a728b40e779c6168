/// Session lifecycle orchestration
///
/// The [`SessionManager`] owns the register / login / logout / refresh /
/// change-password state machine. It composes the password hasher, the token
/// issuer, and the credential store; route handlers call it and translate
/// its errors into HTTP responses.
///
/// # Refresh-token rotation
///
/// Each user record stores at most one valid refresh token. Login and
/// refresh overwrite it, logout clears it, and a presented refresh token is
/// only honored when it equals the persisted value. Overwriting therefore
/// revokes every previously issued refresh token without a deny-list, at the
/// cost of one live session per user.
///
/// Two concurrent refresh calls for the same user race on that single field:
/// both may pass the compare step, then last-writer-wins on the overwrite and
/// the loser's new token is already invalid. That narrow window is accepted;
/// the losing client re-authenticates.
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{
    password::{hash_password, verify_password, PasswordError},
    tokens::{TokenError, TokenIssuer},
};
use crate::models::user::{NewUser, PublicUser, User};
use crate::store::{StoreError, UserStore};

/// Error type for session operations.
///
/// Variants carry the HTTP-facing taxonomy: the API layer maps them to
/// status codes without inspecting messages.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Missing or malformed input (400)
    #[error("{0}")]
    Validation(String),

    /// Username or email already registered (409)
    #[error("{0} is already registered")]
    Conflict(String),

    /// No matching user (404)
    #[error("{0}")]
    NotFound(String),

    /// Password verification failed (401)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bearer credential absent where one is required (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Refresh token expired (401)
    #[error("Refresh token has expired")]
    TokenExpired,

    /// Refresh token failed verification, or was rotated/revoked (401)
    #[error("Refresh token is invalid")]
    TokenInvalid,

    /// Hashing, signing, or store backend failure (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => SessionError::Conflict(field),
            StoreError::Backend(msg) => SessionError::Internal(msg),
        }
    }
}

impl From<PasswordError> for SessionError {
    fn from(err: PasswordError) -> Self {
        SessionError::Internal(err.to_string())
    }
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => SessionError::TokenExpired,
            TokenError::Invalid(_) => SessionError::TokenInvalid,
            TokenError::Signing(msg) | TokenError::Misconfigured(msg) => {
                SessionError::Internal(msg)
            }
        }
    }
}

/// Registration input, as received from the transport layer.
///
/// Media URLs point at blobs uploaded out-of-band; the blob store itself is
/// an external collaborator.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    /// Requested username
    pub username: String,

    /// Email address
    pub email: String,

    /// Display name
    pub full_name: String,

    /// Plaintext password, hashed before it reaches the store
    pub password: String,

    /// Avatar URL
    pub avatar_url: Option<String>,

    /// Cover image URL
    pub cover_image_url: Option<String>,
}

/// A freshly issued access/refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived access token
    pub access_token: String,

    /// Long-lived refresh token, mirrored into the user record
    pub refresh_token: String,
}

/// Result of a successful login or refresh
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated user, credentials stripped
    pub user: PublicUser,

    /// The newly issued token pair
    pub tokens: TokenPair,
}

/// Orchestrates the authentication state machine over a credential store.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn UserStore>,
    issuer: TokenIssuer,
}

impl SessionManager {
    /// Creates a session manager over a store and token issuer
    pub fn new(store: Arc<dyn UserStore>, issuer: TokenIssuer) -> Self {
        Self { store, issuer }
    }

    /// The token issuer, shared with the auth gate
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Registers a new user.
    ///
    /// Identity fields are trimmed and lowercased before any store access.
    /// The returned record carries neither the password hash nor a refresh
    /// token.
    ///
    /// # Errors
    ///
    /// - `Validation` when any required field is blank after trimming
    /// - `Conflict` when the username or email is already registered
    pub async fn register(&self, input: RegisterInput) -> Result<PublicUser, SessionError> {
        let username = input.username.trim().to_lowercase();
        let email = input.email.trim().to_lowercase();
        let full_name = input.full_name.trim().to_string();

        if username.is_empty()
            || email.is_empty()
            || full_name.is_empty()
            || input.password.trim().is_empty()
        {
            return Err(SessionError::Validation(
                "username, email, full name and password are all required".to_string(),
            ));
        }

        if self.store.login_taken(&username, &email).await? {
            return Err(SessionError::Conflict("username or email".to_string()));
        }

        // Hash the password exactly as submitted; trimming is only a
        // blank check, login verifies the same bytes.
        let password_hash = hash_password(&input.password)?;

        // The store's unique constraints are the backstop for the race
        // between login_taken and create_user.
        let user = self
            .store
            .create_user(NewUser {
                username,
                email,
                full_name,
                password_hash,
                avatar_url: input.avatar_url,
                cover_image_url: input.cover_image_url,
            })
            .await?;

        debug!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user.into_public())
    }

    /// Logs a user in by username or email.
    ///
    /// On success the refresh token is persisted onto the user record,
    /// replacing whatever was there; any previously live session's refresh
    /// token stops working.
    ///
    /// # Errors
    ///
    /// - `Validation` when the identifier is blank
    /// - `NotFound` when no user matches
    /// - `InvalidCredentials` when the password does not verify
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthSession, SessionError> {
        let identifier = identifier.trim().to_lowercase();
        if identifier.is_empty() {
            return Err(SessionError::Validation(
                "username or email is required".to_string(),
            ));
        }

        let user = self
            .store
            .find_by_login(&identifier)
            .await?
            .ok_or_else(|| SessionError::NotFound("user does not exist".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(SessionError::InvalidCredentials);
        }

        let tokens = self.issue_and_persist(&user).await?;
        debug!(user_id = %user.id, "login succeeded");

        Ok(AuthSession {
            user: user.into_public(),
            tokens,
        })
    }

    /// Logs a user out by clearing the persisted refresh token.
    ///
    /// Idempotent: logging out an already logged-out user succeeds.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), SessionError> {
        self.store.update_refresh_token(user_id, None).await?;
        debug!(%user_id, "logout, refresh token cleared");
        Ok(())
    }

    /// Exchanges a refresh token for a brand-new access/refresh pair.
    ///
    /// The presented token must verify against the refresh secret AND equal
    /// the persisted current value. A token that was rotated away or cleared
    /// by logout fails the equality check, which is the revocation mechanism.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` when no token was presented
    /// - `TokenExpired` / `TokenInvalid` from signature or expiry checks
    /// - `TokenInvalid` when the user is gone or the token was superseded
    pub async fn refresh(&self, presented: Option<&str>) -> Result<AuthSession, SessionError> {
        let presented = presented
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SessionError::Unauthorized("refresh token missing".to_string()))?;

        let claims = self.issuer.verify_refresh_token(presented)?;

        let user = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or(SessionError::TokenInvalid)?;

        if user.refresh_token.as_deref() != Some(presented) {
            // Signed and unexpired, but superseded or revoked. Either an
            // old token replayed after rotation, or a token cleared by
            // logout.
            warn!(user_id = %user.id, "refresh token reuse detected");
            return Err(SessionError::TokenInvalid);
        }

        let tokens = self.issue_and_persist(&user).await?;
        debug!(user_id = %user.id, "refresh token rotated");

        Ok(AuthSession {
            user: user.into_public(),
            tokens,
        })
    }

    /// Changes an authenticated user's password.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the account no longer exists
    /// - `Validation` when the old password does not verify or the new one
    ///   is blank
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), SessionError> {
        if new_password.trim().is_empty() {
            return Err(SessionError::Validation(
                "new password must not be blank".to_string(),
            ));
        }

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| SessionError::NotFound("user does not exist".to_string()))?;

        if !verify_password(old_password, &user.password_hash)? {
            return Err(SessionError::Validation(
                "old password is incorrect".to_string(),
            ));
        }

        let password_hash = hash_password(new_password)?;
        self.store
            .update_password_hash(user_id, &password_hash)
            .await?;

        debug!(%user_id, "password changed");
        Ok(())
    }

    /// Issues a pair and mirrors the refresh token into the user record.
    async fn issue_and_persist(&self, user: &User) -> Result<TokenPair, SessionError> {
        let access_token = self.issuer.issue_access_token(user)?;
        let refresh_token = self.issuer.issue_refresh_token(user.id)?;

        self.store
            .update_refresh_token(user.id, Some(&refresh_token))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
