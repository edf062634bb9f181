//! Business logic services.

pub mod ingest;
pub mod thumbnail;

pub use ingest::{IngestError, IngestResult, VideoIngest, STAGED_FILE_PREFIX};
pub use thumbnail::ThumbnailIngest;
