//! Upload admission checks.
//!
//! Checks run in a fixed order: video id, bearer token, record existence,
//! ownership, media type, declared length. Nothing here touches the disk
//! or object storage.

use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::HeaderMap;
use tracing::warn;
use tubely_models::{parse_media_type, UploadKind, UserId, Video, VideoId};
use tubely_records::VideoStore;

use crate::auth::authenticate;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Allowance for multipart boundaries and part headers when comparing a
/// declared `Content-Length` against a payload ceiling.
pub const MULTIPART_ENVELOPE_BYTES: u64 = 64 * 1024;

/// Parse a path video id.
pub fn parse_video_id(raw: &str) -> ApiResult<VideoId> {
    raw.parse::<VideoId>()
        .map_err(|_| ApiError::bad_request("Invalid video ID"))
}

/// Fetch a record and require that `user` owns it.
pub async fn load_owned_video(
    records: &dyn VideoStore,
    video_id: &VideoId,
    user: &UserId,
) -> ApiResult<Video> {
    let video = records
        .get_video(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    if !video.is_owned_by(user) {
        warn!(video_id = %video_id, user_id = %user, "Rejected access to another user's video");
        return Err(ApiError::forbidden("You do not own this video"));
    }

    Ok(video)
}

/// Run the identity and ownership checks for an upload.
pub async fn admit(state: &AppState, raw_id: &str, headers: &HeaderMap) -> ApiResult<Video> {
    let video_id = parse_video_id(raw_id)?;
    let user_id = authenticate(headers, &state.config.jwt_secret)?;
    load_owned_video(state.records.as_ref(), &video_id, &user_id).await
}

/// Validate a declared content type against what `kind` accepts.
pub fn accept_media_type(kind: UploadKind, declared: Option<&str>) -> ApiResult<&'static str> {
    let declared = declared.ok_or_else(|| ApiError::bad_request("Missing Content-Type"))?;
    kind.accept(declared).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Invalid file type {:?} for {} upload, expected one of: {}",
            parse_media_type(declared).unwrap_or_default(),
            kind,
            kind.allowed_media_types().join(", ")
        ))
    })
}

/// The request's `Content-Length`, if present and numeric.
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Reject a declared length over `ceiling` before any byte is read.
pub fn check_declared_length(declared: Option<u64>, ceiling: u64) -> ApiResult<()> {
    match declared {
        Some(length) if length > ceiling => Err(ApiError::payload_too_large(format!(
            "Upload of {} bytes exceeds the {} byte limit",
            length, ceiling
        ))),
        _ => Ok(()),
    }
}

/// The request's `Content-Type` header.
pub fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

/// Whether the body is `multipart/form-data`.
pub fn is_multipart(headers: &HeaderMap) -> bool {
    content_type(headers)
        .and_then(parse_media_type)
        .is_some_and(|m| m == "multipart/form-data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use tubely_records::MemoryVideoStore;

    #[test]
    fn test_parse_video_id() {
        assert!(parse_video_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        let err = parse_video_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_load_owned_video() {
        let store = MemoryVideoStore::new();
        let owner = UserId::new();
        let video = Video::new(owner, "mine", "");
        store.create_video(&video).await.unwrap();

        let loaded = load_owned_video(&store, &video.id, &owner).await.unwrap();
        assert_eq!(loaded.id, video.id);

        let err = load_owned_video(&store, &video.id, &UserId::new()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = load_owned_video(&store, &VideoId::new(), &owner).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_accept_media_type() {
        assert_eq!(
            accept_media_type(UploadKind::Video, Some("Video/MP4; codecs=avc1")).unwrap(),
            "video/mp4"
        );
        assert_eq!(
            accept_media_type(UploadKind::Thumbnail, Some("image/png")).unwrap(),
            "image/png"
        );

        let err = accept_media_type(UploadKind::Video, Some("video/quicktime")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(accept_media_type(UploadKind::Thumbnail, Some("image/gif")).is_err());
        assert!(accept_media_type(UploadKind::Video, None).is_err());
    }

    #[test]
    fn test_check_declared_length() {
        assert!(check_declared_length(None, 10).is_ok());
        assert!(check_declared_length(Some(10), 10).is_ok());

        let err = check_declared_length(Some(11), 10).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_is_multipart() {
        let mut headers = HeaderMap::new();
        assert!(!is_multipart(&headers));

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=xyz"),
        );
        assert!(is_multipart(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
        assert!(!is_multipart(&headers));
    }
}
