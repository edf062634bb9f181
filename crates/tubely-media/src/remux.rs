//! Faststart remuxing.
//!
//! Rewrites an MP4 container so its index (moov atom) precedes the media
//! data. Streams are copied, never re-encoded.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, ToolRunner};
use crate::error::{MediaError, MediaResult};

/// Suffix inserted before the extension of the remuxed file.
pub const FASTSTART_SUFFIX: &str = "-faststart";

/// Derive the output path for a remux: `dir/name.mp4` -> `dir/name-faststart.mp4`.
pub fn faststart_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, FASTSTART_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, FASTSTART_SUFFIX),
    };
    input.with_file_name(file_name)
}

/// Build the ffmpeg invocation for a faststart remux.
pub fn faststart_command(input: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .copy_streams()
        .movflags("faststart")
        .format("mp4")
}

/// Remux `input` into a new faststart file next to it.
///
/// The input is left in place. On failure any partial output is removed.
pub async fn remux_faststart(input: &Path, runner: &ToolRunner) -> MediaResult<PathBuf> {
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    let output = faststart_output_path(input);
    let cmd = faststart_command(input, &output);

    debug!("Remuxing {} -> {}", input.display(), output.display());

    if let Err(e) = runner.run(&cmd.build_args()).await {
        remove_partial_output(&output).await;
        return Err(e);
    }

    info!("Remuxed {} for faststart", input.display());
    Ok(output)
}

async fn remove_partial_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial remux output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial remux output {}: {}", path.display(), e),
    }
}
