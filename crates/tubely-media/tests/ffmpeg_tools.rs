//! End-to-end checks against the real ffmpeg/ffprobe binaries.
//!
//! Skipped when the tools are not installed.

use std::path::{Path, PathBuf};

use tubely_media::{
    check_ffmpeg, check_ffprobe, probe_streams, FfmpegCommand, FfmpegRemuxer, FfprobeClassifier,
    Remuxer, StreamClassifier, ToolRunner,
};
use tubely_models::OrientationTag;

fn tools_available() -> bool {
    check_ffmpeg().is_ok() && check_ffprobe().is_ok()
}

/// Render a one-second synthetic clip of the given size.
async fn synthesize(dir: &Path, name: &str, size: &str) -> PathBuf {
    let output = dir.join(name);
    let cmd = FfmpegCommand::new(format!("testsrc=size={size}:rate=10:duration=1"), &output)
        .input_arg("-f")
        .input_arg("lavfi")
        .output_arg("-c:v")
        .output_arg("mpeg4");
    ToolRunner::ffmpeg()
        .run(&cmd.build_args())
        .await
        .expect("synthesize test clip");
    output
}

#[tokio::test]
async fn test_remux_keeps_streams_and_input() {
    if !tools_available() {
        eprintln!("ffmpeg/ffprobe not installed, skipping");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let input = synthesize(dir.path(), "upload.mp4", "320x180").await;

    let output = FfmpegRemuxer::new(None).remux(&input).await.unwrap();

    assert!(input.exists(), "remux must not delete its input");
    assert_ne!(input, output);

    let runner = ToolRunner::ffprobe();
    let before = probe_streams(&input, &runner).await.unwrap();
    let after = probe_streams(&output, &runner).await.unwrap();
    assert_eq!(before.len(), after.len());
}

#[tokio::test]
async fn test_classify_real_files() {
    if !tools_available() {
        eprintln!("ffmpeg/ffprobe not installed, skipping");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let classifier = FfprobeClassifier::new(None);

    let landscape = synthesize(dir.path(), "wide.mp4", "320x180").await;
    assert_eq!(
        classifier.classify(&landscape).await.unwrap(),
        OrientationTag::Landscape
    );

    let portrait = synthesize(dir.path(), "tall.mp4", "180x320").await;
    assert_eq!(
        classifier.classify(&portrait).await.unwrap(),
        OrientationTag::Portrait
    );

    let square = synthesize(dir.path(), "square.mp4", "200x200").await;
    assert_eq!(classifier.classify(&square).await.unwrap(), OrientationTag::Other);
}

#[tokio::test]
async fn test_remux_of_garbage_fails_with_diagnostics() {
    if !tools_available() {
        eprintln!("ffmpeg/ffprobe not installed, skipping");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("garbage.mp4");
    tokio::fs::write(&input, b"this is not an mp4").await.unwrap();

    let err = FfmpegRemuxer::new(None).remux(&input).await.unwrap_err();

    assert!(err.diagnostics().is_some());
    assert!(input.exists());
    assert!(!tubely_media::faststart_output_path(&input).exists());
}
