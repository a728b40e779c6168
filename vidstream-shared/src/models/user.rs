/// User account model
///
/// The credential store owns these records. Identity fields (username,
/// email) are globally unique and normalized to lowercase before they reach
/// the store. The password is held only as an Argon2id hash, and the
/// `refresh_token` field mirrors the single currently-valid refresh token so
/// it can be revoked by overwrite or clear.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username CITEXT NOT NULL UNIQUE,
///     email CITEXT NOT NULL UNIQUE,
///     full_name VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     avatar_url VARCHAR(512),
///     cover_image_url VARCHAR(512),
///     refresh_token TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored user account.
///
/// This is the store-facing shape: it carries the password hash and the
/// current refresh token. It must never be serialized into an HTTP response;
/// handlers return [`PublicUser`] instead.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id (UUID v4)
    pub id: Uuid,

    /// Unique username, lowercase
    pub username: String,

    /// Unique email address, lowercase
    pub email: String,

    /// Display name
    pub full_name: String,

    /// Argon2id password hash. Never the plaintext.
    pub password_hash: String,

    /// Avatar image URL in the blob store
    pub avatar_url: Option<String>,

    /// Cover image URL in the blob store
    pub cover_image_url: Option<String>,

    /// The single currently-valid refresh token, if a session is live.
    /// Cleared on logout, overwritten on login and refresh.
    pub refresh_token: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Strips credentials for client consumption
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            avatar_url: self.avatar_url,
            cover_image_url: self.cover_image_url,
            created_at: self.created_at,
        }
    }
}

/// The sanitized projection of a user: no password hash, no refresh token.
/// Serialized in camelCase, matching the rest of the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    /// Unique user id
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,

    /// Display name
    pub full_name: String,

    /// Avatar image URL
    pub avatar_url: Option<String>,

    /// Cover image URL
    pub cover_image_url: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user record.
///
/// The session manager normalizes identity fields and hashes the password
/// before building this; the store persists it as-is.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Username, already trimmed and lowercased
    pub username: String,

    /// Email, already trimmed and lowercased
    pub email: String,

    /// Display name, already trimmed
    pub full_name: String,

    /// Argon2id password hash (not the plaintext)
    pub password_hash: String,

    /// Avatar URL, if one was uploaded beforehand
    pub avatar_url: Option<String>,

    /// Cover image URL, if one was uploaded beforehand
    pub cover_image_url: Option<String>,
}
