//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::handlers::{
    create_video, get_video, health, list_videos, ready, upload_thumbnail, upload_video,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Upload bodies are bounded by the ingestion pipeline's own byte count
    let upload_routes = Router::new()
        .route("/videos/:video_id/upload", post(upload_video))
        .route("/thumbnails/:video_id/upload", post(upload_thumbnail))
        .layer(DefaultBodyLimit::disable());

    let video_routes = Router::new()
        .route("/videos", post(create_video).get(list_videos))
        .route("/videos/:video_id", get(get_video))
        .layer(RequestBodyLimitLayer::new(state.config.max_json_body_bytes));

    let api_routes = Router::new().merge(upload_routes).merge(video_routes);

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/assets", ServeDir::new(&state.config.assets_root))
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
