//! Object storage for processed uploads.
//!
//! This crate provides:
//! - The `ObjectStore` put-object trait the ingestion pipeline depends on
//! - An S3 implementation (AWS, or any S3-compatible endpoint)
//! - Public URL construction for stored keys

pub mod client;
pub mod error;
pub mod traits;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
pub use traits::{validate_key, ObjectStore};
