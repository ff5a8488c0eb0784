//! `[MM:SS.ff]word` transcripts.
//!
//! One word per line. Lines that do not carry a leading bracketed timestamp are not an error:
//! aligner output routinely contains headers and blank lines, so they are skipped and logged at
//! `debug`.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context as _;
use regex::Regex;

use crate::align::aligner::AlignedWord;
use crate::foundation::error::KaraokeResult;
use crate::timing::timecode::{format_display_timestamp, parse_display_timestamp};

static WORD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(\d+:\d+\.\d+)\](.*)").expect("word line pattern is valid")
});

/// One word of the transcript and the instant (seconds) it is revealed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimedWord {
    /// Reveal time in seconds.
    pub time: f64,
    /// Token text, trimmed, case preserved.
    pub text: String,
}

/// Build the word stream from transcript text.
///
/// Payloads are trimmed and blank payloads dropped. Order is preserved as written; decreasing
/// timestamps are kept in place and reported once with a warning.
pub fn parse_lrc_words(text: &str) -> Vec<TimedWord> {
    let mut words = Vec::new();
    let mut warned_decreasing = false;

    for (lineno, line) in text.lines().enumerate() {
        let Some(caps) = WORD_LINE.captures(line) else {
            if !line.trim().is_empty() {
                tracing::debug!(line = lineno + 1, "skipping line without word timestamp");
            }
            continue;
        };

        let word = caps[2].trim();
        if word.is_empty() {
            continue;
        }
        let time = match parse_display_timestamp(&caps[1]) {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!(line = lineno + 1, error = %e, "skipping unparsable timestamp");
                continue;
            }
        };

        if !warned_decreasing
            && let Some(prev) = words.last().map(|w: &TimedWord| w.time)
            && time < prev
        {
            tracing::warn!(
                line = lineno + 1,
                time,
                previous = prev,
                "word timestamps decrease; keeping transcript order"
            );
            warned_decreasing = true;
        }

        words.push(TimedWord {
            time,
            text: word.to_owned(),
        });
    }

    words
}

/// Read and parse a UTF-8 transcript file. A leading byte-order mark is ignored.
pub fn read_lrc_words(path: &Path) -> KaraokeResult<Vec<TimedWord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read transcript '{}'", path.display()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let words = parse_lrc_words(text);
    tracing::debug!(path = %path.display(), words = words.len(), "loaded transcript");
    Ok(words)
}

/// Render aligner output in the transcript format, one lowercased word per line.
pub fn write_lrc(words: &[AlignedWord]) -> String {
    let mut out = String::new();
    for w in words {
        out.push('[');
        out.push_str(&format_display_timestamp(w.start));
        out.push(']');
        out.push_str(&w.word.to_lowercase());
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/transcript/lrc.rs"]
mod tests;
