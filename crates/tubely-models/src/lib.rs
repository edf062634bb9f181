//! Shared data models for the Tubely backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video records and their owners
//! - Orientation tags derived from display aspect ratios
//! - Storage keys for uploaded artifacts
//! - Upload kinds and their accepted media types

pub mod media_type;
pub mod orientation;
pub mod storage_key;
pub mod video;

// Re-export common types
pub use media_type::{parse_media_type, UploadKind};
pub use orientation::OrientationTag;
pub use storage_key::StorageKey;
pub use video::{IdParseError, UserId, Video, VideoId};
