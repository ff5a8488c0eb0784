use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::encode::ffmpeg::{ensure_parent_dir, is_ffmpeg_on_path};
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::timing::timecode::parse_trim_timecode;

/// Optional cut points in seconds. `None` keeps the input's own start or end.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrimRange {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl TrimRange {
    /// Parse user-entered trim bounds; `-1` or an empty field leaves that side open.
    pub fn parse(start: &str, end: &str) -> KaraokeResult<Self> {
        let range = Self {
            start: parse_trim_timecode(start)?,
            end: parse_trim_timecode(end)?,
        };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> KaraokeResult<()> {
        for v in [self.start, self.end].into_iter().flatten() {
            if !v.is_finite() || v < 0.0 {
                return Err(KaraokeError::validation(
                    "trim bounds must be finite and >= 0",
                ));
            }
        }
        if let (Some(s), Some(e)) = (self.start, self.end)
            && e <= s
        {
            return Err(KaraokeError::validation(format!(
                "trim end ({e}s) must be after trim start ({s}s)"
            )));
        }
        Ok(())
    }

    /// Whether the range cuts anything at all.
    pub fn is_noop(&self) -> bool {
        self.start.is_none_or(|s| s == 0.0) && self.end.is_none()
    }
}

pub(crate) fn trim_args(input: &Path, range: TrimRange, out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-v", "error", "-i"].map(OsString::from).into();
    args.push(input.as_os_str().to_owned());
    if let Some(s) = range.start {
        args.push("-ss".into());
        args.push(format!("{s:.3}").into());
    }
    if let Some(e) = range.end {
        args.push("-to".into());
        args.push(format!("{e:.3}").into());
    }
    args.push("-vn".into());
    args.push(out.as_os_str().to_owned());
    args
}

/// Cut `input` to `range` and write the result to `out` (format chosen by its extension).
#[tracing::instrument(skip_all, fields(input = %input.display(), out = %out.display()))]
pub fn trim_audio(input: &Path, range: TrimRange, out: &Path) -> KaraokeResult<()> {
    range.validate()?;
    if !input.is_file() {
        return Err(KaraokeError::validation(format!(
            "audio file '{}' does not exist",
            input.display()
        )));
    }
    if !is_ffmpeg_on_path() {
        return Err(KaraokeError::external("ffmpeg not found on PATH"));
    }
    ensure_parent_dir(out)?;

    let output = Command::new("ffmpeg")
        .args(trim_args(input, range, out))
        .stdin(Stdio::null())
        .output()
        .map_err(|e| KaraokeError::external(format!("failed to run ffmpeg: {e}")))?;
    if !output.status.success() {
        return Err(KaraokeError::external(format!(
            "ffmpeg trim of '{}' exited with {}: {}",
            input.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    tracing::info!(start = ?range.start, end = ?range.end, "audio trimmed");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/media/trim.rs"]
mod tests;
