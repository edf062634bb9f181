//! Video and thumbnail upload handlers.

use std::fmt::Display;

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::Json;
use bytes::Bytes;
use futures_util::Stream;
use tracing::info;
use tubely_models::{UploadKind, Video};

use crate::error::{ApiError, ApiResult};
use crate::gate::{self, MULTIPART_ENVELOPE_BYTES};
use crate::state::AppState;

/// Upload the video file for a record.
///
/// POST /api/videos/:video_id/upload
pub async fn upload_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    request: Request,
) -> ApiResult<Json<Video>> {
    receive(state, UploadKind::Video, video_id, request).await.map(Json)
}

/// Upload the thumbnail image for a record.
///
/// POST /api/thumbnails/:video_id/upload
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    request: Request,
) -> ApiResult<Json<Video>> {
    receive(state, UploadKind::Thumbnail, video_id, request).await.map(Json)
}

async fn receive(
    state: AppState,
    kind: UploadKind,
    raw_id: String,
    request: Request,
) -> ApiResult<Video> {
    let video = gate::admit(&state, &raw_id, request.headers()).await?;
    info!(video_id = %video.id, user_id = %video.user_id, kind = %kind, "Upload admitted");

    // The run owns the request body. Dropping this handler (client gone)
    // does not cancel a run that has already started an external tool.
    let run = tokio::spawn(run_upload(state, kind, video, request));
    run.await
        .map_err(|e| ApiError::internal(format!("Upload task failed: {}", e)))?
}

async fn run_upload(
    state: AppState,
    kind: UploadKind,
    video: Video,
    request: Request,
) -> ApiResult<Video> {
    let ceiling = match kind {
        UploadKind::Video => state.videos.max_bytes(),
        UploadKind::Thumbnail => state.thumbnails.max_bytes(),
    };
    let declared = gate::declared_length(request.headers());

    if !gate::is_multipart(request.headers()) {
        let media_type = gate::accept_media_type(kind, gate::content_type(request.headers()))?;
        gate::check_declared_length(declared, ceiling)?;
        let body = request.into_body().into_data_stream();
        return ingest(&state, kind, video, media_type, body).await;
    }

    let mut multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(kind.form_field()) {
            continue;
        }
        let media_type = gate::accept_media_type(kind, field.content_type())?;
        gate::check_declared_length(declared, ceiling.saturating_add(MULTIPART_ENVELOPE_BYTES))?;
        return ingest(&state, kind, video, media_type, field).await;
    }

    Err(ApiError::bad_request(format!(
        "Missing form field '{}'",
        kind.form_field()
    )))
}

async fn ingest<S, E>(
    state: &AppState,
    kind: UploadKind,
    video: Video,
    media_type: &'static str,
    body: S,
) -> ApiResult<Video>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let video = match kind {
        UploadKind::Video => state.videos.ingest_video(video, body).await?,
        UploadKind::Thumbnail => {
            state
                .thumbnails
                .ingest_thumbnail(video, media_type, body)
                .await?
        }
    };
    Ok(video)
}
