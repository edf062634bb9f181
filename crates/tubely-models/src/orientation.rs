//! Orientation classification of a video's display aspect ratio.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse orientation of a video, used as the storage key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationTag {
    /// 16:9
    Landscape,
    /// 9:16
    Portrait,
    /// Any other reported ratio
    Other,
    /// The file reported no streams
    Unknown,
}

impl OrientationTag {
    /// Map a display aspect ratio string (e.g. "16:9") to an orientation.
    ///
    /// Only exact matches count; an empty ratio is `Other`.
    pub fn from_display_aspect_ratio(ratio: &str) -> Self {
        match ratio.trim() {
            "16:9" => OrientationTag::Landscape,
            "9:16" => OrientationTag::Portrait,
            _ => OrientationTag::Other,
        }
    }

    /// The tag used when placing an object in storage.
    ///
    /// `Unknown` never appears in a key.
    pub fn placement(self) -> Self {
        match self {
            OrientationTag::Unknown => OrientationTag::Other,
            tag => tag,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrientationTag::Landscape => "landscape",
            OrientationTag::Portrait => "portrait",
            OrientationTag::Other => "other",
            OrientationTag::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OrientationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
