//! Video record repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use tubely_models::{UserId, Video, VideoId};

use crate::error::{StoreError, StoreResult};

/// Persistence for video records.
///
/// Writes are whole-record replacements. Two concurrent updates of the same
/// id are not serialized; the later write wins.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Fetch a record by id.
    async fn get_video(&self, id: &VideoId) -> StoreResult<Option<Video>>;

    /// Replace an existing record.
    async fn update_video(&self, video: &Video) -> StoreResult<()>;

    /// Insert a new record.
    async fn create_video(&self, video: &Video) -> StoreResult<()>;

    /// All records owned by `user_id`, newest first.
    async fn list_videos_for_user(&self, user_id: &UserId) -> StoreResult<Vec<Video>>;
}

/// In-process record store.
#[derive(Debug, Default)]
pub struct MemoryVideoStore {
    videos: RwLock<HashMap<VideoId, Video>>,
}

impl MemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.videos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.videos.read().await.is_empty()
    }
}

#[async_trait]
impl VideoStore for MemoryVideoStore {
    async fn get_video(&self, id: &VideoId) -> StoreResult<Option<Video>> {
        Ok(self.videos.read().await.get(id).cloned())
    }

    async fn update_video(&self, video: &Video) -> StoreResult<()> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(&video.id) {
            Some(existing) => {
                *existing = video.clone();
                debug!(video_id = %video.id, "Updated video record");
                Ok(())
            }
            None => Err(StoreError::not_found(video.id)),
        }
    }

    async fn create_video(&self, video: &Video) -> StoreResult<()> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(StoreError::AlreadyExists(video.id.to_string()));
        }
        videos.insert(video.id, video.clone());
        debug!(video_id = %video.id, user_id = %video.user_id, "Created video record");
        Ok(())
    }

    async fn list_videos_for_user(&self, user_id: &UserId) -> StoreResult<Vec<Video>> {
        let videos = self.videos.read().await;
        let mut owned: Vec<Video> = videos
            .values()
            .filter(|v| v.is_owned_by(user_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}
