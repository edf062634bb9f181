//! Thumbnail ingestion.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::Stream;
use tracing::info;
use tubely_models::media_type::image_extension;
use tubely_models::{StorageKey, UploadKind, Video};
use tubely_records::VideoStore;

use super::ingest::{write_limited, IngestError, IngestResult};
use crate::metrics;

/// Writes thumbnails into the assets directory and records their URL.
pub struct ThumbnailIngest {
    records: Arc<dyn VideoStore>,
    assets_root: PathBuf,
    public_base_url: String,
    max_bytes: u64,
}

impl ThumbnailIngest {
    pub fn new(
        records: Arc<dyn VideoStore>,
        assets_root: PathBuf,
        public_base_url: impl Into<String>,
        max_bytes: u64,
    ) -> Self {
        Self {
            records,
            assets_root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn assets_root(&self) -> &Path {
        &self.assets_root
    }

    /// File name a thumbnail of `media_type` is stored under.
    pub fn file_name(video: &Video, media_type: &str) -> String {
        format!("{}.{}", video.id, image_extension(media_type))
    }

    /// Store the thumbnail for `video` and return the updated record.
    pub async fn ingest_thumbnail<S, E>(
        &self,
        video: Video,
        media_type: &str,
        body: S,
    ) -> IngestResult<Video>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let result = self.run(video, media_type, body).await;
        match &result {
            Ok(_) => metrics::record_ingest(UploadKind::Thumbnail.as_str(), "ok"),
            Err(e) => metrics::record_ingest(UploadKind::Thumbnail.as_str(), e.stage()),
        }
        result
    }

    async fn run<S, E>(&self, mut video: Video, media_type: &str, body: S) -> IngestResult<Video>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        tokio::fs::create_dir_all(&self.assets_root)
            .await
            .map_err(IngestError::Staging)?;

        let file_name = Self::file_name(&video, media_type);
        let target = self.assets_root.join(&file_name);

        // Written under a temp name, then renamed into place.
        let partial = tempfile::Builder::new()
            .prefix(".thumbnail-")
            .tempfile_in(&self.assets_root)
            .map_err(IngestError::Staging)?;
        let (file, path) = partial.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let written = write_limited(body, &mut file, self.max_bytes).await?;
        drop(file);
        path.persist(&target)
            .map_err(|e| IngestError::Staging(e.error))?;
        metrics::record_ingest_bytes(UploadKind::Thumbnail.as_str(), written);

        let token = StorageKey::generate();
        video.set_thumbnail_url(format!(
            "{}/assets/{}?v={}",
            self.public_base_url, file_name, token
        ));
        self.records
            .update_video(&video)
            .await
            .map_err(IngestError::Record)?;

        info!(
            video_id = %video.id,
            user_id = %video.user_id,
            path = %target.display(),
            bytes = written,
            "Thumbnail stored"
        );

        Ok(video)
    }
}
