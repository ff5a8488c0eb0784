use std::ffi::OsString;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::Context as _;

use crate::encode::sink::{FrameCursor, FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::render::backend::FrameRGBA;

const LOG_TAIL_LINES: usize = 12;

/// Encodes the lyric track to an H.264 MP4 with the system `ffmpeg`, muxing the song when one is
/// configured.
///
/// Frames go to `ffmpeg` as they are: the renderer paints the opaque key color under every word,
/// so no alpha reaches the encoder. `ffmpeg` diagnostics are written to
/// [`encode_log_path`] and quoted when encoding fails.
pub struct FfmpegSink {
    out_path: PathBuf,
    encoder: Option<Encoder>,
}

struct Encoder {
    child: Child,
    stdin: Option<ChildStdin>,
    log_path: PathBuf,
    frame_len: usize,
    cursor: FrameCursor,
}

impl FfmpegSink {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            encoder: None,
        }
    }
}

/// Where the encoder log for `out` goes: `lyrics.mp4` logs to `lyrics.ffmpeg.log`.
pub fn encode_log_path(out: &Path) -> PathBuf {
    out.with_extension("ffmpeg.log")
}

pub(crate) fn validate_sink_config(cfg: &SinkConfig) -> KaraokeResult<()> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(KaraokeError::validation("fps must be non-zero"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(KaraokeError::validation("video size must be non-zero"));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(KaraokeError::validation(format!(
            "video size {}x{} must be even for yuv420p",
            cfg.width, cfg.height
        )));
    }
    if let Some(song) = cfg.audio.as_deref()
        && !song.is_file()
    {
        return Err(KaraokeError::validation(format!(
            "song '{}' does not exist",
            song.display()
        )));
    }
    Ok(())
}

fn os_args<'a>(args: impl IntoIterator<Item = &'a str>) -> impl Iterator<Item = OsString> {
    args.into_iter().map(OsString::from)
}

/// Arguments that read raw RGBA frames from stdin and write the lyric track to `out`.
pub(crate) fn encode_args(cfg: &SinkConfig, out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = os_args(["-y", "-loglevel", "error"]).collect();
    args.extend(os_args(["-f", "rawvideo", "-pix_fmt", "rgba", "-s"]));
    args.push(format!("{}x{}", cfg.width, cfg.height).into());
    args.push("-r".into());
    args.push(format!("{}/{}", cfg.fps.num, cfg.fps.den).into());
    args.extend(os_args(["-i", "pipe:0"]));
    push_song_mux(&mut args, cfg.audio.as_deref());
    args.extend(os_args([
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-movflags",
        "+faststart",
    ]));
    args.push(out.into());
    args
}

/// The song is the second input, encoded as AAC; the output stops with the shorter stream.
fn push_song_mux(args: &mut Vec<OsString>, song: Option<&Path>) {
    let Some(song) = song else {
        args.push("-an".into());
        return;
    };
    args.push("-i".into());
    args.push(song.into());
    args.extend(os_args([
        "-map", "0:v:0", "-map", "1:a:0", "-c:a", "aac", "-shortest",
    ]));
}

/// Last `n` non-empty lines of an encoder log.
pub(crate) fn log_tail(log: &str, n: usize) -> String {
    let lines: Vec<&str> = log.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

impl FrameSink for FfmpegSink {
    #[tracing::instrument(skip_all, fields(out = %self.out_path.display()))]
    fn begin(&mut self, cfg: SinkConfig) -> KaraokeResult<()> {
        if self.encoder.is_some() {
            return Err(KaraokeError::validation("lyric track encoder already running"));
        }
        validate_sink_config(&cfg)?;
        if !is_ffmpeg_on_path() {
            return Err(KaraokeError::external(
                "ffmpeg is required to encode the lyric track, but was not found on PATH",
            ));
        }
        ensure_parent_dir(&self.out_path)?;

        let log_path = encode_log_path(&self.out_path);
        let log = File::create(&log_path)
            .with_context(|| format!("failed to create encoder log '{}'", log_path.display()))?;

        tracing::debug!(audio = ?cfg.audio, log = %log_path.display(), "starting encoder");
        let mut child = Command::new("ffmpeg")
            .args(encode_args(&cfg, &self.out_path))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(log)
            .spawn()
            .map_err(|e| KaraokeError::external(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child.stdin.take();

        self.encoder = Some(Encoder {
            child,
            stdin,
            log_path,
            frame_len: (cfg.width as usize) * (cfg.height as usize) * 4,
            cursor: FrameCursor::default(),
        });
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KaraokeResult<()> {
        let enc = self
            .encoder
            .as_mut()
            .ok_or_else(|| KaraokeError::validation("lyric track encoder not started"))?;
        enc.cursor.advance(idx)?;
        if frame.data.len() != enc.frame_len {
            return Err(KaraokeError::validation(format!(
                "frame {} has {} bytes, encoder expects {}",
                idx.0,
                frame.data.len(),
                enc.frame_len
            )));
        }
        let stdin = enc
            .stdin
            .as_mut()
            .ok_or_else(|| KaraokeError::external("ffmpeg stdin is closed"))?;
        stdin.write_all(&frame.data).map_err(|e| {
            KaraokeError::external(format!(
                "ffmpeg stopped accepting frames at {} ({e}); see log '{}'",
                idx.0,
                enc.log_path.display()
            ))
        })
    }

    fn end(&mut self) -> KaraokeResult<()> {
        let mut enc = self
            .encoder
            .take()
            .ok_or_else(|| KaraokeError::validation("lyric track encoder not started"))?;
        drop(enc.stdin.take());
        let status = enc
            .child
            .wait()
            .map_err(|e| KaraokeError::external(format!("failed to wait for ffmpeg: {e}")))?;
        if status.success() {
            tracing::debug!(out = %self.out_path.display(), "lyric track encoded");
            return Ok(());
        }
        let log = std::fs::read_to_string(&enc.log_path).unwrap_or_default();
        Err(KaraokeError::external(format!(
            "ffmpeg exited with {status} (log '{}'): {}",
            enc.log_path.display(),
            log_tail(&log, LOG_TAIL_LINES)
        )))
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if let Some(mut enc) = self.encoder.take() {
            drop(enc.stdin.take());
            let _ = enc.child.kill();
            let _ = enc.child.wait();
        }
    }
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> KaraokeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

pub fn is_ffmpeg_on_path() -> bool {
    is_tool_on_path("ffmpeg")
}

pub(crate) fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
