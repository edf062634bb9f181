//! Random storage keys for uploaded artifacts.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::orientation::OrientationTag;

/// Number of random bytes in a key (256 bits of entropy).
pub const STORAGE_KEY_BYTES: usize = 32;

/// Extension of stored video objects.
pub const VIDEO_EXTENSION: &str = "mp4";

/// A fresh, unpredictable identifier for a stored artifact.
///
/// Uniqueness is probabilistic. Keys are never checked against existing
/// objects and must never be reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Draw a new key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; STORAGE_KEY_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// The 64-character lowercase hex form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Object key for a processed video: `{orientation}/{key}.mp4`.
    pub fn video_object_key(&self, orientation: OrientationTag) -> String {
        format!(
            "{}/{}.{}",
            orientation.placement(),
            self.0,
            VIDEO_EXTENSION
        )
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_is_64_lowercase_hex() {
        let key = StorageKey::generate();
        assert_eq!(key.as_str().len(), 64);
        assert!(key
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_keys_are_pairwise_distinct() {
        let keys: HashSet<String> = (0..1000)
            .map(|_| StorageKey::generate().as_str().to_string())
            .collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_video_object_key_format() {
        let key = StorageKey::generate();

        let landscape = key.video_object_key(OrientationTag::Landscape);
        assert_eq!(landscape, format!("landscape/{}.mp4", key));

        let portrait = key.video_object_key(OrientationTag::Portrait);
        assert!(portrait.starts_with("portrait/"));

        // Unknown collapses to other
        let unknown = key.video_object_key(OrientationTag::Unknown);
        assert_eq!(unknown, format!("other/{}.mp4", key));
    }
}
