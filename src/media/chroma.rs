use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use anyhow::Context as _;

use crate::encode::ffmpeg::{ensure_parent_dir, is_ffmpeg_on_path};
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::media::probe::{MediaInfo, probe_media};

/// Audio codecs that can be stream-copied into the MP4 output.
const COPYABLE_AUDIO: &[&str] = &["aac", "mp3", "opus", "vorbis"];

/// Named parameters of the chroma-key overlay.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChromaParams {
    /// `chromakey` similarity in `(0, 1]`.
    pub similarity: f64,
    /// `chromakey` blend in `[0, 1]`.
    pub blend: f64,
    /// Offset into the background video where the overlay starts, in seconds.
    pub start_secs: f64,
    /// Background slow-down factor; the background plays `speed` times slower.
    pub speed: f64,
    /// Key color as six hex digits, without prefix.
    pub key_color: String,
    pub encoder: String,
    pub preset: String,
    pub crf: u32,
    /// Hold the last background frame when the background runs out.
    pub freeze_short_background: bool,
}

impl Default for ChromaParams {
    fn default() -> Self {
        Self {
            similarity: 0.70,
            blend: 0.03,
            start_secs: 15.0,
            speed: 1.25,
            key_color: "00ff00".to_owned(),
            encoder: "libx264".to_owned(),
            preset: "ultrafast".to_owned(),
            crf: 18,
            freeze_short_background: true,
        }
    }
}

impl ChromaParams {
    pub fn validate(&self) -> KaraokeResult<()> {
        if !(self.similarity.is_finite() && self.similarity > 0.0 && self.similarity <= 1.0) {
            return Err(KaraokeError::validation(
                "chroma similarity must be in (0, 1]",
            ));
        }
        if !(self.blend.is_finite() && (0.0..=1.0).contains(&self.blend)) {
            return Err(KaraokeError::validation("chroma blend must be in [0, 1]"));
        }
        if !(self.start_secs.is_finite() && self.start_secs >= 0.0) {
            return Err(KaraokeError::validation(
                "chroma start offset must be finite and >= 0",
            ));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(KaraokeError::validation("chroma speed must be > 0"));
        }
        if self.key_color.len() != 6 || !self.key_color.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(KaraokeError::validation(format!(
                "chroma key color '{}' must be six hex digits",
                self.key_color
            )));
        }
        if self.encoder.trim().is_empty() {
            return Err(KaraokeError::validation("chroma encoder must be non-empty"));
        }
        Ok(())
    }

    fn is_x26x(&self) -> bool {
        matches!(
            self.encoder.to_ascii_lowercase().as_str(),
            "libx264" | "libx265" | "x264"
        )
    }
}

/// Probed facts the filter graph depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct OverlayGeometry {
    pub(crate) fg_duration: f64,
    pub(crate) bg_duration: f64,
    pub(crate) bg_width: u32,
    pub(crate) bg_height: u32,
}

/// Result of an overlay run; a non-zero exit is reported, not raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChromaOutcome {
    /// `ffmpeg` exit code; `None` when killed by a signal.
    pub exit_code: Option<i32>,
    /// File holding the captured `ffmpeg` stderr.
    pub log_path: PathBuf,
}

impl ChromaOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Background chain: cut from the start offset, freeze-pad if short, slow down, then cut to the
/// foreground duration.
pub(crate) fn background_chain(p: &ChromaParams, g: &OverlayGeometry) -> String {
    let available = (g.bg_duration - p.start_secs).max(0.0);
    let required = g.fg_duration * p.speed;

    let mut chain = if available <= 0.0 {
        let extra = (required - g.bg_duration).max(0.0);
        let mut c = format!("trim=start=0:duration={},setpts=PTS-STARTPTS", g.bg_duration);
        if extra > 0.0 && p.freeze_short_background {
            c.push_str(&format!(",tpad=stop_mode=clone:stop_duration={extra}"));
        }
        c
    } else {
        let used = available.min(required);
        let mut c = format!(
            "trim=start={}:duration={used},setpts=PTS-STARTPTS",
            p.start_secs
        );
        if available < required && p.freeze_short_background {
            let extra = required - available;
            c.push_str(&format!(",tpad=stop_mode=clone:stop_duration={extra}"));
        }
        c
    };
    chain.push_str(&format!(
        ",setpts=PTS/{},trim=duration={:.6},setpts=PTS-STARTPTS",
        p.speed, g.fg_duration
    ));
    chain
}

pub(crate) fn build_filter_complex(p: &ChromaParams, g: &OverlayGeometry) -> String {
    let ratio = if g.bg_height != 0 {
        f64::from(g.bg_width) / f64::from(g.bg_height)
    } else {
        1.0
    };
    let ratio = format!("{ratio:.9}");
    let (w, h) = (g.bg_width, g.bg_height);
    let scale = format!(
        r"scale=if(gt(iw/ih\,{ratio})\,{w}\,-1):if(gt(iw/ih\,{ratio})\,-1\,{h})"
    );
    format!(
        "[0:v]{bg}[bg];[1:v]{scale},chromakey=0x{key}:{sim}:{blend},format=rgba[fg];\
         [bg][fg]overlay=(main_w-overlay_w)/2:(main_h-overlay_h)/2:shortest=1[outv]",
        bg = background_chain(p, g),
        key = p.key_color,
        sim = p.similarity,
        blend = p.blend,
    )
}

pub(crate) fn overlay_args(
    bg: &Path,
    fg: &Path,
    out: &Path,
    p: &ChromaParams,
    filter: &str,
    copy_audio: bool,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |s: &str| args.push(OsString::from(s));
    for s in ["-y", "-threads", "0", "-filter_complex_threads", "0", "-i"] {
        push(s);
    }
    args.push(bg.as_os_str().to_owned());
    args.push("-i".into());
    args.push(fg.as_os_str().to_owned());
    args.push("-filter_complex".into());
    args.push(filter.into());
    args.push("-map".into());
    args.push("[outv]".into());

    args.push("-map".into());
    args.push("1:a?".into());
    if copy_audio {
        args.extend(["-c:a", "copy"].map(OsString::from));
    } else {
        args.extend(["-c:a", "aac", "-b:a", "192k"].map(OsString::from));
    }

    args.push("-c:v".into());
    args.push(p.encoder.as_str().into());
    if p.is_x26x() {
        args.push("-preset".into());
        args.push(p.preset.as_str().into());
    }
    args.push("-crf".into());
    args.push(p.crf.to_string().into());
    args.extend(["-movflags", "+faststart", "-shortest"].map(OsString::from));
    args.push(out.as_os_str().to_owned());
    args
}

fn geometry(fg: &MediaInfo, bg: &MediaInfo) -> KaraokeResult<OverlayGeometry> {
    let (bg_width, bg_height) = bg.video_size.ok_or_else(|| {
        KaraokeError::external(format!(
            "no video stream in background '{}'",
            bg.source_path.display()
        ))
    })?;
    Ok(OverlayGeometry {
        fg_duration: fg.duration_secs,
        bg_duration: bg.duration_secs,
        bg_width,
        bg_height,
    })
}

fn overlay_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("karaoke_overlay_log_{}.txt", std::process::id()))
}

/// Copy `ffmpeg` output line by line into `log`, mirroring it at debug level.
pub(crate) fn pump_log<R: BufRead, W: Write>(reader: R, log: &mut W) -> io::Result<usize> {
    let mut lines = 0;
    for line in reader.lines() {
        let line = line?;
        tracing::debug!(target: "karaoke::ffmpeg", "{line}");
        writeln!(log, "{line}")?;
        lines += 1;
    }
    log.flush()?;
    Ok(lines)
}

/// Drain the child's stderr into `log`. On failure the child is killed and reaped.
pub(crate) fn record_child_log<W: Write>(
    child: &mut Child,
    log: &mut W,
    log_path: &Path,
) -> KaraokeResult<()> {
    let pumped = match child.stderr.take() {
        Some(stderr) => pump_log(BufReader::new(stderr), log),
        None => Ok(0),
    };
    if let Err(e) = pumped {
        let _ = child.kill();
        let _ = child.wait();
        return Err(KaraokeError::external(format!(
            "failed to record ffmpeg output in '{}': {e}",
            log_path.display()
        )));
    }
    Ok(())
}

/// Key out `params.key_color` from `fg` and composite it centered over `bg`, writing `out`.
///
/// The background starts at `params.start_secs`, plays `params.speed` times slower and is cut to
/// the foreground duration. The foreground audio is kept.
#[tracing::instrument(skip_all, fields(bg = %bg.display(), fg = %fg.display(), out = %out.display()))]
pub fn overlay_chroma(
    bg: &Path,
    fg: &Path,
    out: &Path,
    params: &ChromaParams,
) -> KaraokeResult<ChromaOutcome> {
    params.validate()?;
    for (role, p) in [("background", bg), ("foreground", fg)] {
        if !p.is_file() {
            return Err(KaraokeError::validation(format!(
                "{role} video '{}' does not exist",
                p.display()
            )));
        }
    }
    if !is_ffmpeg_on_path() {
        return Err(KaraokeError::external("ffmpeg not found on PATH"));
    }

    let fg_info = probe_media(fg)?;
    let bg_info = probe_media(bg)?;
    let filter = build_filter_complex(params, &geometry(&fg_info, &bg_info)?);
    let copy_audio = fg_info
        .audio_codec
        .as_deref()
        .is_some_and(|c| COPYABLE_AUDIO.contains(&c));
    let args = overlay_args(bg, fg, out, params, &filter, copy_audio);
    tracing::debug!(?args, "ffmpeg overlay command");

    ensure_parent_dir(out)?;
    let log_path = overlay_log_path();
    let mut log = std::fs::File::create(&log_path)
        .with_context(|| format!("create overlay log '{}'", log_path.display()))?;

    let mut child = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| KaraokeError::external(format!("failed to spawn ffmpeg: {e}")))?;

    record_child_log(&mut child, &mut log, &log_path)?;
    let status = child
        .wait()
        .map_err(|e| KaraokeError::external(format!("failed to wait for ffmpeg: {e}")))?;

    let outcome = ChromaOutcome {
        exit_code: status.code(),
        log_path,
    };
    if outcome.success() {
        tracing::info!("overlay finished");
    } else {
        tracing::warn!(
            exit_code = ?outcome.exit_code,
            log = %outcome.log_path.display(),
            "ffmpeg overlay failed"
        );
    }
    Ok(outcome)
}

#[cfg(test)]
#[path = "../../tests/unit/media/chroma.rs"]
mod tests;
