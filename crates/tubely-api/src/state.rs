//! Application state.

use std::sync::Arc;

use tubely_media::{FfmpegRemuxer, FfprobeClassifier, Remuxer, StreamClassifier};
use tubely_records::{MemoryVideoStore, VideoStore};
use tubely_storage::{ObjectStore, S3Client, StorageResult};

use crate::config::ApiConfig;
use crate::services::{ThumbnailIngest, VideoIngest};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub records: Arc<dyn VideoStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub videos: Arc<VideoIngest>,
    pub thumbnails: Arc<ThumbnailIngest>,
}

impl AppState {
    /// Create application state backed by S3 and the ffmpeg tools.
    pub async fn new(config: ApiConfig) -> StorageResult<Self> {
        let objects = S3Client::new(config.s3.clone()).await?;
        let remuxer = FfmpegRemuxer::new(Some(config.ffmpeg_timeout));
        let classifier = FfprobeClassifier::new(Some(config.ffprobe_timeout));

        Ok(Self::from_parts(
            config,
            Arc::new(remuxer),
            Arc::new(classifier),
            Arc::new(objects),
            Arc::new(MemoryVideoStore::new()),
        ))
    }

    /// Assemble state from explicit collaborators.
    pub fn from_parts(
        config: ApiConfig,
        remuxer: Arc<dyn Remuxer>,
        classifier: Arc<dyn StreamClassifier>,
        objects: Arc<dyn ObjectStore>,
        records: Arc<dyn VideoStore>,
    ) -> Self {
        let videos = VideoIngest::new(
            remuxer,
            classifier,
            Arc::clone(&objects),
            Arc::clone(&records),
            config.temp_dir(),
            config.max_video_upload_bytes,
        );
        let thumbnails = ThumbnailIngest::new(
            Arc::clone(&records),
            config.assets_root.clone(),
            config.platform_url.clone(),
            config.max_thumbnail_upload_bytes,
        );

        Self {
            config: Arc::new(config),
            records,
            objects,
            videos: Arc::new(videos),
            thumbnails: Arc::new(thumbnails),
        }
    }
}
