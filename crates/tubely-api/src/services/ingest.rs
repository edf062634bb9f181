//! Video ingestion pipeline.
//!
//! Stages the request body to disk, remuxes it for faststart playback,
//! classifies its orientation, uploads the remuxed file and records the
//! resulting URL. Every temp file a run creates is removed before the run
//! returns, whatever the outcome.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tempfile::TempPath;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use tubely_media::{MediaError, Remuxer, StreamClassifier};
use tubely_models::media_type::VIDEO_MP4;
use tubely_models::{OrientationTag, StorageKey, UploadKind, Video};
use tubely_records::{StoreError, VideoStore};
use tubely_storage::{ObjectStore, StorageError};

use crate::metrics;

/// Prefix of every staged upload file.
pub const STAGED_FILE_PREFIX: &str = "tubely-upload-";

/// Errors that abort an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("Failed to read upload body: {0}")]
    Transport(String),

    #[error("Failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Failed to process video: {0}")]
    Processing(#[source] MediaError),

    #[error("Failed to store video: {0}")]
    Storage(#[source] StorageError),

    #[error("Failed to update video record: {0}")]
    Record(#[source] StoreError),
}

pub type IngestResult<T> = Result<T, IngestError>;

impl IngestError {
    /// Stage label used for metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            IngestError::TooLarge { .. } => "too_large",
            IngestError::Transport(_) => "transport",
            IngestError::Staging(_) => "staging",
            IngestError::Processing(_) => "remux",
            IngestError::Storage(_) => "storage",
            IngestError::Record(_) => "record",
        }
    }
}

/// Copy the whole of `body` into `file`, failing once more than `limit`
/// bytes have been read. Returns the number of bytes written.
pub(crate) async fn write_limited<S, E>(
    body: S,
    file: &mut tokio::fs::File,
    limit: u64,
) -> IngestResult<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let mut body = std::pin::pin!(body);
    let mut written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| IngestError::Transport(e.to_string()))?;
        written += chunk.len() as u64;
        if written > limit {
            return Err(IngestError::TooLarge { limit });
        }
        file.write_all(&chunk).await.map_err(IngestError::Staging)?;
    }

    file.flush().await.map_err(IngestError::Staging)?;
    Ok(written)
}

/// The video ingestion pipeline.
pub struct VideoIngest {
    remuxer: Arc<dyn Remuxer>,
    classifier: Arc<dyn StreamClassifier>,
    objects: Arc<dyn ObjectStore>,
    records: Arc<dyn VideoStore>,
    temp_dir: PathBuf,
    max_bytes: u64,
}

impl VideoIngest {
    pub fn new(
        remuxer: Arc<dyn Remuxer>,
        classifier: Arc<dyn StreamClassifier>,
        objects: Arc<dyn ObjectStore>,
        records: Arc<dyn VideoStore>,
        temp_dir: PathBuf,
        max_bytes: u64,
    ) -> Self {
        Self {
            remuxer,
            classifier,
            objects,
            records,
            temp_dir,
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Run the pipeline for `video` and return the updated record.
    pub async fn ingest_video<S, E>(&self, video: Video, body: S) -> IngestResult<Video>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let result = self.run(video, body).await;
        match &result {
            Ok(_) => metrics::record_ingest(UploadKind::Video.as_str(), "ok"),
            Err(e) => metrics::record_ingest(UploadKind::Video.as_str(), e.stage()),
        }
        result
    }

    async fn run<S, E>(&self, mut video: Video, body: S) -> IngestResult<Video>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let staged = self.stage(body).await?;
        debug!(video_id = %video.id, path = %staged.display(), "Staged upload");

        let start = Instant::now();
        let remuxed = self
            .remuxer
            .remux(&staged)
            .await
            .map_err(IngestError::Processing)?;
        let remuxed = TempPath::try_from_path(remuxed).map_err(IngestError::Staging)?;
        metrics::record_ffmpeg_duration(start.elapsed().as_secs_f64());

        let orientation = self.classify(&video, &remuxed).await;

        let key = StorageKey::generate().video_object_key(orientation);

        let start = Instant::now();
        self.objects
            .put_object(&key, &remuxed, VIDEO_MP4)
            .await
            .map_err(IngestError::Storage)?;
        metrics::record_upload_duration(start.elapsed().as_secs_f64());

        video.set_video_url(self.objects.object_url(&key));
        self.records
            .update_video(&video)
            .await
            .map_err(IngestError::Record)?;

        info!(
            video_id = %video.id,
            user_id = %video.user_id,
            key = %key,
            orientation = %orientation,
            "Video ingested"
        );

        Ok(video)
    }

    /// Copy the body into a fresh temp file.
    ///
    /// The returned path deletes the file when dropped.
    async fn stage<S, E>(&self, body: S) -> IngestResult<TempPath>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let staged = tempfile::Builder::new()
            .prefix(STAGED_FILE_PREFIX)
            .suffix(".mp4")
            .tempfile_in(&self.temp_dir)
            .map_err(IngestError::Staging)?;
        let (file, path) = staged.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let written = write_limited(body, &mut file, self.max_bytes).await?;
        drop(file);

        metrics::record_ingest_bytes(UploadKind::Video.as_str(), written);
        Ok(path)
    }

    /// Orientation used for key placement. Classification never fails a run.
    async fn classify(&self, video: &Video, path: &Path) -> OrientationTag {
        let start = Instant::now();
        let classified = self.classifier.classify(path).await;
        metrics::record_ffprobe_duration(start.elapsed().as_secs_f64());

        match classified {
            Ok(tag) => tag.placement(),
            Err(e) => {
                warn!(video_id = %video.id, error = %e, "Classification failed, using other");
                metrics::record_classification_fallback();
                OrientationTag::Other
            }
        }
    }
}
