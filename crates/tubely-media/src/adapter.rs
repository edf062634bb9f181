//! Adapter traits over the external media tools.
//!
//! The ingestion pipeline depends on these traits rather than on process
//! spawning, so an in-process implementation or a fake can stand in.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tubely_models::OrientationTag;

use crate::command::ToolRunner;
use crate::error::MediaResult;
use crate::probe::probe_orientation;
use crate::remux::remux_faststart;

/// Produces a faststart copy of an MP4 file.
#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Remux `input` into a new file and return its path.
    ///
    /// Must not delete `input`.
    async fn remux(&self, input: &Path) -> MediaResult<PathBuf>;
}

/// Reports the orientation of a media file.
#[async_trait]
pub trait StreamClassifier: Send + Sync {
    async fn classify(&self, path: &Path) -> MediaResult<OrientationTag>;
}

/// [`Remuxer`] backed by the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    runner: ToolRunner,
}

impl FfmpegRemuxer {
    pub fn new(timeout: Option<Duration>) -> Self {
        let runner = ToolRunner::ffmpeg();
        Self {
            runner: match timeout {
                Some(t) => runner.with_timeout(t),
                None => runner,
            },
        }
    }

    pub fn with_runner(runner: ToolRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    async fn remux(&self, input: &Path) -> MediaResult<PathBuf> {
        remux_faststart(input, &self.runner).await
    }
}

/// [`StreamClassifier`] backed by the ffprobe CLI.
#[derive(Debug, Clone)]
pub struct FfprobeClassifier {
    runner: ToolRunner,
}

impl FfprobeClassifier {
    pub fn new(timeout: Option<Duration>) -> Self {
        let runner = ToolRunner::ffprobe();
        Self {
            runner: match timeout {
                Some(t) => runner.with_timeout(t),
                None => runner,
            },
        }
    }

    pub fn with_runner(runner: ToolRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl StreamClassifier for FfprobeClassifier {
    async fn classify(&self, path: &Path) -> MediaResult<OrientationTag> {
        probe_orientation(path, &self.runner).await
    }
}
