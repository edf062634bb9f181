//! Video record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Error returned when an identifier is not a well-formed UUID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid identifier: {0}")]
pub struct IdParseError(pub String);

/// Unique identifier for a video record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub Uuid);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VideoId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| IdParseError(s.to_string()))
    }
}

/// Identifier of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| IdParseError(s.to_string()))
    }
}

/// Video metadata record.
///
/// The ingestion pipeline only ever writes `video_url` and `thumbnail_url`;
/// everything else is owned by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Unique video ID
    pub id: VideoId,

    /// Owner of the video
    pub user_id: UserId,

    /// Video title
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Public URL of the thumbnail, once uploaded
    pub thumbnail_url: Option<String>,

    /// Object storage URL of the processed video, once uploaded
    pub video_url: Option<String>,
}

impl Video {
    /// Create a new draft record with no artifacts attached.
    pub fn new(user_id: UserId, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: VideoId::new(),
            user_id,
            title: title.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_url: None,
        }
    }

    /// Whether `user` owns this video.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.user_id == *user
    }

    /// Point the record at an uploaded video object.
    pub fn set_video_url(&mut self, url: impl Into<String>) {
        self.video_url = Some(url.into());
        self.updated_at = Utc::now();
    }

    /// Point the record at an uploaded thumbnail.
    pub fn set_thumbnail_url(&mut self, url: impl Into<String>) {
        self.thumbnail_url = Some(url.into());
        self.updated_at = Utc::now();
    }
}
