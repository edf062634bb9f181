//! FFprobe stream inspection and orientation classification.

use serde::Deserialize;
use std::path::Path;

use tubely_models::OrientationTag;

use crate::command::ToolRunner;
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<StreamInfo>,
}

/// Metadata of a single stream as reported by ffprobe.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamInfo {
    pub codec_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub display_aspect_ratio: Option<String>,
}

/// Arguments for `ffprobe -v error -print_format json -show_streams <path>`.
fn probe_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_streams".to_string(),
        path.to_string_lossy().to_string(),
    ]
}

/// Parse ffprobe's JSON stream listing.
pub fn parse_streams(stdout: &[u8]) -> MediaResult<Vec<StreamInfo>> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;
    Ok(probe.streams)
}

/// Classify parsed streams by the first stream's display aspect ratio.
pub fn orientation_of(streams: &[StreamInfo]) -> OrientationTag {
    match streams.first() {
        None => OrientationTag::Unknown,
        Some(stream) => OrientationTag::from_display_aspect_ratio(
            stream.display_aspect_ratio.as_deref().unwrap_or_default(),
        ),
    }
}

/// Probe all streams of a media file.
pub async fn probe_streams(path: &Path, runner: &ToolRunner) -> MediaResult<Vec<StreamInfo>> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let output = runner.run(&probe_args(path)).await?;
    parse_streams(&output.stdout)
}

/// Classify the orientation of a media file.
pub async fn probe_orientation(path: &Path, runner: &ToolRunner) -> MediaResult<OrientationTag> {
    let streams = probe_streams(path, runner).await?;
    Ok(orientation_of(&streams))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(json: &str) -> MediaResult<OrientationTag> {
        parse_streams(json.as_bytes()).map(|s| orientation_of(&s))
    }

    #[test]
    fn test_landscape_and_portrait() {
        let landscape = r#"{"streams":[{"codec_type":"video","width":1920,"height":1080,"display_aspect_ratio":"16:9"}]}"#;
        assert_eq!(classify(landscape).unwrap(), OrientationTag::Landscape);

        let portrait = r#"{"streams":[{"codec_type":"video","width":1080,"height":1920,"display_aspect_ratio":"9:16"}]}"#;
        assert_eq!(classify(portrait).unwrap(), OrientationTag::Portrait);
    }

    #[test]
    fn test_other_ratio() {
        let square = r#"{"streams":[{"codec_type":"video","display_aspect_ratio":"1:1"}]}"#;
        assert_eq!(classify(square).unwrap(), OrientationTag::Other);
    }

    #[test]
    fn test_only_first_stream_counts() {
        let json = r#"{"streams":[
            {"codec_type":"audio"},
            {"codec_type":"video","display_aspect_ratio":"16:9"}
        ]}"#;
        assert_eq!(classify(json).unwrap(), OrientationTag::Other);
    }

    #[test]
    fn test_no_streams_is_unknown() {
        assert_eq!(classify(r#"{"streams":[]}"#).unwrap(), OrientationTag::Unknown);
        assert_eq!(classify("{}").unwrap(), OrientationTag::Unknown);
    }

    #[test]
    fn test_malformed_output_is_parse_error() {
        let err = classify("").unwrap_err();
        assert!(err.is_parse_error());

        let err = classify("{\"streams\": 5}").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_probe_args() {
        let args = probe_args(Path::new("/tmp/a.mp4"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/a.mp4"));
        assert!(args.contains(&"-show_streams".to_string()));
    }

    #[tokio::test]
    async fn test_missing_ffprobe_is_not_a_parse_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = probe_orientation(file.path(), &ToolRunner::new("tubely-missing-ffprobe"))
            .await
            .unwrap_err();
        assert!(!err.is_parse_error());
        assert!(matches!(err, MediaError::ToolNotFound { .. }));
    }
}
