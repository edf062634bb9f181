//! Object storage abstraction.

use std::path::Path;

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};

/// Generic put-object capability.
///
/// Implementations must be safe for concurrent use; the ingestion pipeline
/// shares one instance across all in-flight uploads.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `body` under `key`.
    ///
    /// Returns only once the store has acknowledged the object.
    async fn put_object(&self, key: &str, body: &Path, content_type: &str) -> StorageResult<()>;

    /// Public locator for an object key.
    fn object_url(&self, key: &str) -> String;

    /// Cheap round-trip used by readiness checks.
    async fn check_connectivity(&self) -> StorageResult<()>;
}

/// Reject keys that would escape their prefix or are empty.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.starts_with('/')
        || key.split('/').any(|segment| segment.is_empty() || segment == "..")
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
