//! Upload kinds and the media types they accept.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const VIDEO_MP4: &str = "video/mp4";
pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_PNG: &str = "image/png";

/// Default ceiling for video uploads (1 GiB).
pub const DEFAULT_MAX_VIDEO_BYTES: u64 = 1 << 30;

/// Default ceiling for thumbnail uploads (10 MiB).
pub const DEFAULT_MAX_THUMBNAIL_BYTES: u64 = 10 << 20;

/// What an upload request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    Video,
    Thumbnail,
}

impl UploadKind {
    /// Media types accepted for this kind.
    pub fn allowed_media_types(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Video => &[VIDEO_MP4],
            UploadKind::Thumbnail => &[IMAGE_JPEG, IMAGE_PNG],
        }
    }

    /// Name of the multipart form field carrying the file.
    pub fn form_field(&self) -> &'static str {
        match self {
            UploadKind::Video => "video",
            UploadKind::Thumbnail => "thumbnail",
        }
    }

    /// Validate a declared content type, returning the normalized media type.
    pub fn accept(&self, content_type: &str) -> Option<&'static str> {
        let media_type = parse_media_type(content_type)?;
        self.allowed_media_types()
            .iter()
            .copied()
            .find(|allowed| *allowed == media_type)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Video => "video",
            UploadKind::Thumbnail => "thumbnail",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse the media type out of a `Content-Type` value.
///
/// Parameters are dropped and the result is lowercased. Returns `None` when
/// the value is not of the form `type/subtype`.
pub fn parse_media_type(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim();
    let (kind, subtype) = essence.split_once('/')?;

    let valid = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    if !valid(kind) || !valid(subtype) {
        return None;
    }

    Some(essence.to_ascii_lowercase())
}

/// File extension for an accepted image media type.
pub fn image_extension(media_type: &str) -> &'static str {
    match media_type {
        IMAGE_JPEG => "jpg",
        IMAGE_PNG => "png",
        _ => "bin",
    }
}
