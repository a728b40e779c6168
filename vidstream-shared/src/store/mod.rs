/// Credential store abstraction
///
/// The session manager and auth gate talk to persistence through the
/// [`UserStore`] trait, never to a concrete database. Two implementations
/// ship with the workspace:
///
/// - [`postgres::PgUserStore`]: sqlx/Postgres, used in production. Uniqueness
///   is enforced by database constraints and the read models are computed
///   with store-side joins.
/// - [`memory::MemoryUserStore`]: RwLock'd maps, used by the test suites and
///   for local development without a database.
///
/// Store calls are the only suspension points in the auth flows; token
/// signing and password hashing are pure CPU work.
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    channel::{ChannelProfile, WatchedVideo},
    user::{NewUser, User},
};

pub mod memory;
pub mod postgres;

/// Error type for credential store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique identity field (username or email) is already taken
    #[error("Duplicate value for unique field: {0}")]
    Duplicate(String),

    /// Backend failure (connection, query, corrupt row)
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Persistence operations needed by the session lifecycle and read models.
///
/// Lookups by login identifier are case-insensitive; callers still normalize
/// to lowercase on write so the stored values are canonical.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user record.
    ///
    /// Fails with `StoreError::Duplicate` when the username or email is
    /// already taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Looks up a user by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Looks up a user by username or email
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;

    /// Whether a username or email is already registered
    async fn login_taken(&self, username: &str, email: &str) -> Result<bool, StoreError>;

    /// Overwrites (or clears, with `None`) the persisted refresh token.
    ///
    /// This is a single-field write: it must not re-validate or rewrite the
    /// rest of the record.
    async fn update_refresh_token(
        &self,
        id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Replaces the stored password hash
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError>;

    /// Channel profile with subscriber counts, as seen by `viewer`.
    ///
    /// Returns `None` when no such channel username exists.
    async fn channel_profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
    ) -> Result<Option<ChannelProfile>, StoreError>;

    /// The user's watch history, most recent first
    async fn watch_history(&self, user_id: Uuid) -> Result<Vec<WatchedVideo>, StoreError>;

    /// Cheap connectivity probe for health checks
    async fn ping(&self) -> Result<(), StoreError>;
}
