/// Postgres-backed credential store
///
/// Uses sqlx with runtime-checked queries. Username/email uniqueness is
/// enforced by `UNIQUE` constraints on CITEXT columns, so lookups are
/// case-insensitive at the database level; the read models (channel profile,
/// watch history) are computed with store-side joins and subselects.
///
/// # Example
///
/// ```no_run
/// use vidstream_shared::store::postgres::PgUserStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = PgUserStore::connect("postgresql://localhost/vidstream", 10).await?;
/// store.run_migrations().await?;
/// # Ok(())
/// # }
/// ```
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::models::{
    channel::{ChannelProfile, WatchedVideo},
    user::{NewUser, User},
};

/// Embedded migrations from `vidstream-shared/migrations/`
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const USER_COLUMNS: &str = "id, username, email, full_name, password_hash, \
     avatar_url, cover_image_url, refresh_token, created_at, updated_at";

/// Credential store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool with sane timeouts.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the database is unreachable.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(url)
            .await
            .map_err(StoreError::from)?;

        info!(max_connections, "connected to postgres");
        Ok(Self { pool })
    }

    /// Applies any pending migrations
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {}", e)))?;
        info!("database migrations applied");
        Ok(())
    }

    /// Access to the underlying pool, for code outside the trait surface
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // Unique constraint names are `users_username_key` / `users_email_key`
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("username") {
                    return StoreError::Duplicate("username".to_string());
                }
                if constraint.contains("email") {
                    return StoreError::Duplicate("email".to_string());
                }
            }
        }
        StoreError::Backend(err.to_string())
    }
}

#[derive(sqlx::FromRow)]
struct ChannelRow {
    id: Uuid,
    username: String,
    full_name: String,
    avatar_url: Option<String>,
    cover_image_url: Option<String>,
    subscriber_count: i64,
    subscribed_to_count: i64,
    is_subscribed: bool,
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let query = format!(
            r#"
            INSERT INTO users (username, email, full_name, password_hash, avatar_url, cover_image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(user.username)
            .bind(user.email)
            .bind(user.full_name)
            .bind(user.password_hash)
            .bind(user.avatar_url)
            .bind(user.cover_image_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        // CITEXT makes the comparison case-insensitive
        let query =
            format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn login_taken(&self, username: &str, email: &str) -> Result<bool, StoreError> {
        let (taken,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn update_refresh_token(
        &self,
        id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(refresh_token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn channel_profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
    ) -> Result<Option<ChannelProfile>, StoreError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar_url, u.cover_image_url,
                   (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id)
                       AS subscriber_count,
                   (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id)
                       AS subscribed_to_count,
                   EXISTS(SELECT 1 FROM subscriptions s
                          WHERE s.channel_id = u.id AND s.subscriber_id = $2)
                       AS is_subscribed
            FROM users u
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ChannelProfile {
            id: r.id,
            username: r.username,
            full_name: r.full_name,
            avatar_url: r.avatar_url,
            cover_image_url: r.cover_image_url,
            subscriber_count: r.subscriber_count,
            subscribed_to_count: r.subscribed_to_count,
            is_subscribed: r.is_subscribed,
        }))
    }

    async fn watch_history(&self, user_id: Uuid) -> Result<Vec<WatchedVideo>, StoreError> {
        let entries = sqlx::query_as::<_, WatchedVideo>(
            r#"
            SELECT v.id AS video_id, v.title, v.thumbnail_url,
                   o.full_name AS owner_name, w.watched_at
            FROM watch_history w
            JOIN videos v ON v.id = w.video_id
            JOIN users o ON o.id = v.owner_id
            WHERE w.user_id = $1
            ORDER BY w.watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
