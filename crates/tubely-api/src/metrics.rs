//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "tubely_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "tubely_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "tubely_http_requests_in_flight";

    // Ingestion metrics
    pub const INGEST_TOTAL: &str = "tubely_ingest_total";
    pub const INGEST_BYTES_TOTAL: &str = "tubely_ingest_bytes_total";
    pub const CLASSIFICATION_FALLBACKS_TOTAL: &str = "tubely_classification_fallbacks_total";

    // Processing metrics
    pub const FFMPEG_DURATION_SECONDS: &str = "tubely_ffmpeg_duration_seconds";
    pub const FFPROBE_DURATION_SECONDS: &str = "tubely_ffprobe_duration_seconds";
    pub const UPLOAD_DURATION_SECONDS: &str = "tubely_upload_duration_seconds";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record the outcome of an ingestion run.
///
/// `outcome` is `ok` or the name of the stage that failed.
pub fn record_ingest(kind: &str, outcome: &str) {
    let labels = [("kind", kind.to_string()), ("outcome", outcome.to_string())];
    counter!(names::INGEST_TOTAL, &labels).increment(1);
}

/// Record bytes accepted from a client.
pub fn record_ingest_bytes(kind: &str, bytes: u64) {
    let labels = [("kind", kind.to_string())];
    counter!(names::INGEST_BYTES_TOTAL, &labels).increment(bytes);
}

/// Record a classification that fell back to `other`.
pub fn record_classification_fallback() {
    counter!(names::CLASSIFICATION_FALLBACKS_TOTAL).increment(1);
}

/// Record FFmpeg remux duration.
pub fn record_ffmpeg_duration(duration_secs: f64) {
    histogram!(names::FFMPEG_DURATION_SECONDS).record(duration_secs);
}

/// Record FFprobe duration.
pub fn record_ffprobe_duration(duration_secs: f64) {
    histogram!(names::FFPROBE_DURATION_SECONDS).record(duration_secs);
}

/// Record object storage upload duration.
pub fn record_upload_duration(duration_secs: f64) {
    histogram!(names::UPLOAD_DURATION_SECONDS).record(duration_secs);
}

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("valid uuid pattern")
});

/// Sanitize path for metrics labels (remove IDs, etc.).
fn sanitize_path(path: &str) -> String {
    if path.starts_with("/assets/") {
        return "/assets/:file".to_string();
    }
    UUID_SEGMENT.replace_all(path, ":id").to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    // Increment in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    // Decrement in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
