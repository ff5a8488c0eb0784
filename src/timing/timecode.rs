//! Timestamp text <-> seconds.
//!
//! Two textual forms exist and they deliberately fail differently:
//!
//! - the per-word display form `MM:SS.ff` ([`parse_display_timestamp`] /
//!   [`format_display_timestamp`]), which callers scanning aligner output treat permissively;
//! - the trim-range form `MM:SS(.sss)` / `H:MM:SS(.sss)` / `-1` ([`parse_trim_timecode`]), which
//!   gates a destructive audio edit and fails fast.

use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::error::{KaraokeError, KaraokeResult};

static DISPLAY_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+):(\d+\.\d+)$").expect("display timestamp pattern is valid")
});

// Absorbs binary float error in `frac * 100` (0.29 * 100 == 28.999999999999996) without
// rounding genuine truncations such as 0.999 up to the next hundredth.
const HUNDREDTHS_EPSILON: f64 = 1e-6;

/// Parse a display timestamp `MM:SS.ff` into seconds.
pub fn parse_display_timestamp(text: &str) -> KaraokeResult<f64> {
    let caps = DISPLAY_TIMESTAMP
        .captures(text.trim())
        .ok_or_else(|| KaraokeError::format(format!("invalid timestamp '{text}'")))?;

    let minutes: u64 = caps[1]
        .parse()
        .map_err(|e| KaraokeError::format(format!("invalid minutes in '{text}': {e}")))?;
    let seconds: f64 = caps[2]
        .parse()
        .map_err(|e| KaraokeError::format(format!("invalid seconds in '{text}': {e}")))?;

    Ok(minutes as f64 * 60.0 + seconds)
}

/// Format seconds as a fixed-width `MM:SS.ff` display timestamp.
///
/// Truncates, never rounds: `59.999` formats as `00:59.99`, not `01:00.00`. Negative and
/// non-finite inputs clamp to zero.
pub fn format_display_timestamp(seconds: f64) -> String {
    let s = if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    };

    let minutes = (s / 60.0).floor();
    let secs = (s % 60.0).floor();
    let hundredths = ((s - minutes * 60.0 - secs) * 100.0 + HUNDREDTHS_EPSILON)
        .floor()
        .clamp(0.0, 99.0);

    format!(
        "{:02}:{:02}.{:02}",
        minutes as u64, secs as u64, hundredths as u64
    )
}

/// Parse a trim-range timecode.
///
/// Returns `Ok(None)` for the unbounded sentinel (`-1` or an empty string).
pub fn parse_trim_timecode(text: &str) -> KaraokeResult<Option<f64>> {
    let s = text.trim();
    if s.is_empty() || s == "-1" {
        return Ok(None);
    }

    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [m, sec] => {
            let minutes = parse_whole(m, text)?;
            let seconds = parse_seconds(sec, text)?;
            Ok(Some(minutes * 60.0 + seconds))
        }
        [h, m, sec] => {
            let hours = parse_whole(h, text)?;
            let minutes = parse_whole(m, text)?;
            if minutes >= 60.0 {
                return Err(KaraokeError::format(format!(
                    "minutes out of range in '{text}'"
                )));
            }
            let seconds = parse_seconds(sec, text)?;
            Ok(Some(hours * 3600.0 + minutes * 60.0 + seconds))
        }
        _ => Err(KaraokeError::format(format!(
            "invalid timecode '{text}' (expected MM:SS, H:MM:SS or -1)"
        ))),
    }
}

fn parse_whole(part: &str, whole: &str) -> KaraokeResult<f64> {
    part.trim()
        .parse::<u64>()
        .map(|v| v as f64)
        .map_err(|_| KaraokeError::format(format!("invalid timecode '{whole}'")))
}

fn parse_seconds(part: &str, whole: &str) -> KaraokeResult<f64> {
    let seconds = part
        .trim()
        .parse::<f64>()
        .map_err(|_| KaraokeError::format(format!("invalid timecode '{whole}'")))?;
    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        return Err(KaraokeError::format(format!(
            "seconds must be within [0, 60) in '{whole}'"
        )));
    }
    Ok(seconds)
}

#[cfg(test)]
#[path = "../../tests/unit/timing/timecode.rs"]
mod tests;
