use std::path::{Path, PathBuf};
use std::process::Command;

use crate::encode::ffmpeg::is_tool_on_path;
use crate::foundation::error::{KaraokeError, KaraokeResult};

/// Container facts read back from `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    pub source_path: PathBuf,
    /// Container duration in seconds.
    pub duration_secs: f64,
    /// First video stream size, if any.
    pub video_size: Option<(u32, u32)>,
    /// Codec name of the first audio stream, if any.
    pub audio_codec: Option<String>,
}

impl MediaInfo {
    pub fn has_audio(&self) -> bool {
        self.audio_codec.is_some()
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    // ffprobe prints durations as strings.
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe container duration and stream layout through `ffprobe`.
#[tracing::instrument(skip_all, fields(path = %source_path.display()))]
pub fn probe_media(source_path: &Path) -> KaraokeResult<MediaInfo> {
    if !is_tool_on_path("ffprobe") {
        return Err(KaraokeError::external("ffprobe not found on PATH"));
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| KaraokeError::external(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(KaraokeError::external(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(source_path, &out.stdout)
}

/// Duration in seconds of `source_path`.
pub fn probe_duration(source_path: &Path) -> KaraokeResult<f64> {
    probe_media(source_path).map(|info| info.duration_secs)
}

pub(crate) fn parse_probe_json(source_path: &Path, json: &[u8]) -> KaraokeResult<MediaInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| KaraokeError::external(format!("ffprobe json parse failed: {e}")))?;

    let duration_secs = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| {
            KaraokeError::external(format!(
                "ffprobe reported no duration for '{}'",
                source_path.display()
            ))
        })?;

    let video_size = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .and_then(|s| s.width.zip(s.height));
    let audio_codec = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .map(|s| s.codec_name.clone().unwrap_or_default().to_ascii_lowercase());

    Ok(MediaInfo {
        source_path: source_path.to_path_buf(),
        duration_secs,
        video_size,
        audio_codec,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
