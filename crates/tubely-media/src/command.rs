//! FFmpeg command builder and external tool runner.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Maximum number of stderr bytes kept for diagnostics.
const STDERR_TAIL_BYTES: usize = 4096;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
        }
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Copy every stream without re-encoding.
    pub fn copy_streams(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Set container mux flags (e.g. `faststart`).
    pub fn movflags(self, flags: impl Into<String>) -> Self {
        self.output_arg("-movflags").output_arg(flags)
    }

    /// Force the output container format.
    pub fn format(self, format: impl Into<String>) -> Self {
        self.output_arg("-f").output_arg(format)
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        // Overwrite the output, log errors only.
        let mut args = vec!["-y".to_string(), "-v".to_string(), "error".to_string()];

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Captured output of a finished tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    /// Tail of stderr, lossily decoded
    pub stderr: String,
}

/// Runs an external tool to completion with an optional deadline.
///
/// The runner always waits for the child to exit (killing it on timeout)
/// before returning, so callers may safely remove the files it was using.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    program: String,
    timeout: Option<Duration>,
}

impl ToolRunner {
    /// Create a runner for an arbitrary program on `PATH`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    pub fn ffmpeg() -> Self {
        Self::new("ffmpeg")
    }

    pub fn ffprobe() -> Self {
        Self::new("ffprobe")
    }

    /// Set a deadline; the process is killed when it expires.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the tool with `args` and collect its output.
    ///
    /// A non-zero exit is reported as [`MediaError::ToolFailed`] carrying the
    /// stderr tail.
    pub async fn run(&self, args: &[String]) -> MediaResult<ToolOutput> {
        let binary = which::which(&self.program)
            .map_err(|_| MediaError::tool_not_found(&self.program))?;

        debug!("Running {}: {} {}", self.program, binary.display(), args.join(" "));
        let started = Instant::now();

        let mut child = Command::new(&binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| MediaError::SpawnFailed {
                tool: self.program.clone(),
                source,
            })?;

        let stdout_task = tokio::spawn(read_all(child.stdout.take()));
        let stderr_task = tokio::spawn(read_all(child.stderr.take()));

        let status = self.wait_for_exit(&mut child).await;

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_tail(&stderr_task.await.unwrap_or_default());

        let status = status?;
        debug!(
            "{} exited with {} after {}ms",
            self.program,
            status,
            started.elapsed().as_millis()
        );

        if status.success() {
            Ok(ToolOutput { stdout, stderr })
        } else {
            Err(MediaError::tool_failed(
                &self.program,
                "exited with non-zero status",
                Some(stderr).filter(|s| !s.is_empty()),
                status.code(),
            ))
        }
    }

    /// Wait for the child, killing and reaping it if the deadline passes.
    async fn wait_for_exit(&self, child: &mut Child) -> MediaResult<ExitStatus> {
        let Some(limit) = self.timeout else {
            return Ok(child.wait().await?);
        };

        let waited = tokio::time::timeout(limit, child.wait()).await;
        match waited {
            Ok(status) => Ok(status?),
            Err(_) => {
                warn!(
                    "{} timed out after {:?}, killing process",
                    self.program, limit
                );
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill {}: {}", self.program, e);
                }
                Err(MediaError::Timeout {
                    tool: self.program.clone(),
                    limit,
                })
            }
        }
    }
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        if let Err(e) = reader.read_to_end(&mut buf).await {
            debug!("Failed to read tool output: {}", e);
        }
    }
    buf
}

/// Keep the last few KiB of stderr, where tools print the actual failure.
fn stderr_tail(bytes: &[u8]) -> String {
    let start = bytes.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::tool_not_found("ffmpeg"))
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::tool_not_found("ffprobe"))
}
