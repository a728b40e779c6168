/// In-memory credential store
///
/// Backs the unit and integration test suites and local development without
/// a Postgres instance. Semantics mirror [`super::postgres::PgUserStore`]:
/// case-insensitive login lookups, uniqueness on username/email, and the
/// same read-model shapes composed application-side.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::models::{
    channel::{ChannelProfile, WatchedVideo},
    user::{NewUser, User},
};

/// A video stub, just enough to serve watch-history entries.
#[derive(Debug, Clone)]
pub struct VideoRecord {
    /// Video id
    pub id: Uuid,

    /// Owning channel's user id
    pub owner_id: Uuid,

    /// Video title
    pub title: String,

    /// Thumbnail URL
    pub thumbnail_url: Option<String>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    videos: HashMap<Uuid, VideoRecord>,
    /// (subscriber, channel) pairs
    subscriptions: Vec<(Uuid, Uuid)>,
    /// (user, video, watched_at) triples
    history: Vec<(Uuid, Uuid, DateTime<Utc>)>,
}

/// Credential store held entirely in process memory.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a video owned by an existing user
    pub async fn add_video(&self, video: VideoRecord) {
        self.inner.write().await.videos.insert(video.id, video);
    }

    /// Records that `subscriber` subscribes to `channel`
    pub async fn add_subscription(&self, subscriber: Uuid, channel: Uuid) {
        let mut inner = self.inner.write().await;
        if !inner.subscriptions.contains(&(subscriber, channel)) {
            inner.subscriptions.push((subscriber, channel));
        }
    }

    /// Appends a watch-history entry for `user`
    pub async fn add_watch(&self, user: Uuid, video: Uuid) {
        self.inner.write().await.history.push((user, video, Utc::now()));
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        for existing in inner.users.values() {
            if existing.username.eq_ignore_ascii_case(&user.username) {
                return Err(StoreError::Duplicate("username".to_string()));
            }
            if existing.email.eq_ignore_ascii_case(&user.email) {
                return Err(StoreError::Duplicate("email".to_string()));
            }
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            password_hash: user.password_hash,
            avatar_url: user.avatar_url,
            cover_image_url: user.cover_image_url,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| {
                u.username.eq_ignore_ascii_case(login) || u.email.eq_ignore_ascii_case(login)
            })
            .cloned())
    }

    async fn login_taken(&self, username: &str, email: &str) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().any(|u| {
            u.username.eq_ignore_ascii_case(username) || u.email.eq_ignore_ascii_case(email)
        }))
    }

    async fn update_refresh_token(
        &self,
        id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(&id) {
            user.refresh_token = refresh_token.map(str::to_string);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn channel_profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
    ) -> Result<Option<ChannelProfile>, StoreError> {
        let inner = self.inner.read().await;

        let Some(channel) = inner
            .users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
        else {
            return Ok(None);
        };

        let subscriber_count = inner
            .subscriptions
            .iter()
            .filter(|(_, c)| *c == channel.id)
            .count() as i64;
        let subscribed_to_count = inner
            .subscriptions
            .iter()
            .filter(|(s, _)| *s == channel.id)
            .count() as i64;
        let is_subscribed = viewer
            .map(|v| inner.subscriptions.contains(&(v, channel.id)))
            .unwrap_or(false);

        Ok(Some(ChannelProfile {
            id: channel.id,
            username: channel.username.clone(),
            full_name: channel.full_name.clone(),
            avatar_url: channel.avatar_url.clone(),
            cover_image_url: channel.cover_image_url.clone(),
            subscriber_count,
            subscribed_to_count,
            is_subscribed,
        }))
    }

    async fn watch_history(&self, user_id: Uuid) -> Result<Vec<WatchedVideo>, StoreError> {
        let inner = self.inner.read().await;

        let mut entries: Vec<WatchedVideo> = inner
            .history
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .filter_map(|(_, video_id, watched_at)| {
                let video = inner.videos.get(video_id)?;
                let owner = inner.users.get(&video.owner_id)?;
                Some(WatchedVideo {
                    video_id: video.id,
                    title: video.title.clone(),
                    thumbnail_url: video.thumbnail_url.clone(),
                    owner_name: owner.full_name.clone(),
                    watched_at: *watched_at,
                })
            })
            .collect();

        entries.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        Ok(entries)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
