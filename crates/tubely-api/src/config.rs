//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tubely_models::media_type::{DEFAULT_MAX_THUMBNAIL_BYTES, DEFAULT_MAX_VIDEO_BYTES};
use tubely_storage::{S3Config, StorageError};

/// Configuration errors that prevent startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Storage configuration error: {0}")]
    Storage(#[from] StorageError),
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// HS256 secret for access tokens
    pub jwt_secret: String,
    /// Public base URL used when building asset URLs
    pub platform_url: String,
    /// Directory thumbnails are written to and served from
    pub assets_root: PathBuf,
    /// Directory for staged uploads (process temp dir when unset)
    pub upload_temp_dir: Option<PathBuf>,
    /// Video body ceiling
    pub max_video_upload_bytes: u64,
    /// Thumbnail body ceiling
    pub max_thumbnail_upload_bytes: u64,
    /// Max JSON request body size
    pub max_json_body_bytes: usize,
    /// Deadline for a single ffmpeg run
    pub ffmpeg_timeout: Duration,
    /// Deadline for a single ffprobe run
    pub ffprobe_timeout: Duration,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Environment (development/production)
    pub environment: String,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    /// Object storage
    pub s3: S3Config,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8091,
            jwt_secret: String::new(),
            platform_url: "http://localhost:8091".to_string(),
            assets_root: PathBuf::from("./assets"),
            upload_temp_dir: None,
            max_video_upload_bytes: DEFAULT_MAX_VIDEO_BYTES,
            max_thumbnail_upload_bytes: DEFAULT_MAX_THUMBNAIL_BYTES,
            max_json_body_bytes: 1024 * 1024, // 1MB
            ffmpeg_timeout: Duration::from_secs(600),
            ffprobe_timeout: Duration::from_secs(30),
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            metrics_enabled: true,
            s3: S3Config::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let port = env_parse("API_PORT", defaults.port);

        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port,
            jwt_secret,
            platform_url: std::env::var("PLATFORM_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            assets_root: std::env::var("ASSETS_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_root),
            upload_temp_dir: std::env::var("UPLOAD_TEMP_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            max_video_upload_bytes: env_parse("MAX_VIDEO_UPLOAD_BYTES", defaults.max_video_upload_bytes),
            max_thumbnail_upload_bytes: env_parse(
                "MAX_THUMBNAIL_UPLOAD_BYTES",
                defaults.max_thumbnail_upload_bytes,
            ),
            max_json_body_bytes: env_parse("MAX_JSON_BODY_BYTES", defaults.max_json_body_bytes),
            ffmpeg_timeout: Duration::from_secs(env_parse("FFMPEG_TIMEOUT_SECS", 600)),
            ffprobe_timeout: Duration::from_secs(env_parse("FFPROBE_TIMEOUT_SECS", 30)),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            s3: S3Config::from_env()?,
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Directory staged uploads are written to.
    pub fn temp_dir(&self) -> PathBuf {
        self.upload_temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}
