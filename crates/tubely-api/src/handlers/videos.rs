//! Video record handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use validator::Validate;
use tubely_models::Video;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::gate;
use crate::state::AppState;

/// Request body for creating a draft video.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVideoRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "description must be at most 5000 characters"))]
    pub description: String,
}

/// Create a draft video record owned by the caller.
///
/// POST /api/videos
pub async fn create_video(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateVideoRequest>,
) -> ApiResult<(StatusCode, Json<Video>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let video = Video::new(user.user_id, request.title.trim(), request.description);
    state.records.create_video(&video).await?;

    info!(video_id = %video.id, user_id = %user.user_id, "Created video draft");
    Ok((StatusCode::CREATED, Json(video)))
}

/// List the caller's videos, newest first.
///
/// GET /api/videos
pub async fn list_videos(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Video>>> {
    let videos = state.records.list_videos_for_user(&user.user_id).await?;
    Ok(Json(videos))
}

/// GET /api/videos/:video_id
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<Video>> {
    let video_id = gate::parse_video_id(&video_id)?;
    let video = gate::load_owned_video(state.records.as_ref(), &video_id, &user.user_id).await?;
    Ok(Json(video))
}
