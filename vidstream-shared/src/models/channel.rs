/// Channel and watch-history read models
///
/// These are query results, not stored documents: the credential store
/// computes them from the users, subscriptions, videos, and watch_history
/// tables (store-side joins in Postgres, application-side composition in the
/// in-memory store).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A channel profile as seen by a (possibly anonymous) viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    /// Channel owner's user id
    pub id: Uuid,

    /// Channel username
    pub username: String,

    /// Channel display name
    pub full_name: String,

    /// Avatar image URL
    pub avatar_url: Option<String>,

    /// Cover image URL
    pub cover_image_url: Option<String>,

    /// How many users subscribe to this channel
    pub subscriber_count: i64,

    /// How many channels this user subscribes to
    pub subscribed_to_count: i64,

    /// Whether the requesting viewer is among the subscribers
    pub is_subscribed: bool,
}

/// One entry of a user's watch history.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WatchedVideo {
    /// Video id
    pub video_id: Uuid,

    /// Video title
    pub title: String,

    /// Thumbnail URL
    pub thumbnail_url: Option<String>,

    /// Display name of the channel that owns the video
    pub owner_name: String,

    /// When this user watched it
    pub watched_at: DateTime<Utc>,
}
