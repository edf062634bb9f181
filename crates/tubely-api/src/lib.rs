//! Axum HTTP API server.
//!
//! This crate provides:
//! - Video and thumbnail upload endpoints with an ordered admission gate
//! - The ingestion pipeline (stage, remux, classify, store, record)
//! - Draft video records and static thumbnail serving
//! - HS256 bearer token authentication
//! - Security headers, request ids and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{IngestError, ThumbnailIngest, VideoIngest};
pub use state::AppState;
