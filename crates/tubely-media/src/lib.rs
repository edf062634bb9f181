//! FFmpeg CLI adapters for video ingestion.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - A tool runner with deadlines and stderr capture
//! - Faststart remuxing (container-only, no re-encode)
//! - Orientation classification via ffprobe
//! - `Remuxer`/`StreamClassifier` traits for substituting the tools

pub mod adapter;
pub mod command;
pub mod error;
pub mod probe;
pub mod remux;

pub use adapter::{FfmpegRemuxer, FfprobeClassifier, Remuxer, StreamClassifier};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, ToolOutput, ToolRunner};
pub use error::{MediaError, MediaResult};
pub use probe::{orientation_of, parse_streams, probe_orientation, probe_streams, StreamInfo};
pub use remux::{faststart_output_path, remux_faststart};
