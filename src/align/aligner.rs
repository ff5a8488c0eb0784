use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::transcript::lrc::write_lrc;

static TRANSCRIPT_SEQ: AtomicU64 = AtomicU64::new(0);

/// One word and its start instant as reported by a forced aligner.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AlignedWord {
    pub word: String,
    /// Start time in seconds.
    pub start: f64,
}

/// Produces word-level start times for `transcript` spoken in `audio`.
pub trait ForcedAligner {
    fn align(&self, audio: &Path, transcript: &str) -> KaraokeResult<Vec<AlignedWord>>;
}

/// Aligner backed by an external command.
///
/// The command is run as `<program> <args..> <audio> <transcript-file>` and must print a JSON
/// array of `{"word": .., "start": ..}` objects on stdout.
#[derive(Clone, Debug)]
pub struct ExternalAligner {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ExternalAligner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments placed before the audio and transcript paths.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl ForcedAligner for ExternalAligner {
    #[tracing::instrument(skip_all, fields(program = %self.program.display(), audio = %audio.display()))]
    fn align(&self, audio: &Path, transcript: &str) -> KaraokeResult<Vec<AlignedWord>> {
        if !audio.is_file() {
            return Err(KaraokeError::validation(format!(
                "audio file '{}' does not exist",
                audio.display()
            )));
        }

        let transcript_path = std::env::temp_dir().join(format!(
            "karaoke_align_transcript_{}_{}.txt",
            std::process::id(),
            TRANSCRIPT_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&transcript_path, transcript)
            .with_context(|| format!("write transcript '{}'", transcript_path.display()))?;

        let out = Command::new(&self.program)
            .args(&self.args)
            .arg(audio)
            .arg(&transcript_path)
            .stdin(Stdio::null())
            .output();
        let _ = std::fs::remove_file(&transcript_path);
        let out = out.map_err(|e| {
            KaraokeError::external(format!(
                "failed to run aligner '{}': {e}",
                self.program.display()
            ))
        })?;

        if !out.status.success() {
            return Err(KaraokeError::external(format!(
                "aligner '{}' exited with {}: {}",
                self.program.display(),
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let words = parse_aligner_output(&out.stdout)?;
        tracing::info!(words = words.len(), "alignment finished");
        Ok(words)
    }
}

pub(crate) fn parse_aligner_output(stdout: &[u8]) -> KaraokeResult<Vec<AlignedWord>> {
    let words: Vec<AlignedWord> = serde_json::from_slice(stdout)
        .map_err(|e| KaraokeError::external(format!("aligner output is not valid JSON: {e}")))?;
    if let Some(bad) = words.iter().find(|w| !w.start.is_finite() || w.start < 0.0) {
        return Err(KaraokeError::external(format!(
            "aligner reported invalid start {} for '{}'",
            bad.start, bad.word
        )));
    }
    Ok(words)
}

/// Align `transcript_path` against `audio` and write the result as a word-timed LRC file.
pub fn generate_lrc(
    aligner: &dyn ForcedAligner,
    audio: &Path,
    transcript_path: &Path,
    out_lrc: &Path,
) -> KaraokeResult<usize> {
    let transcript = std::fs::read_to_string(transcript_path)
        .with_context(|| format!("read transcript '{}'", transcript_path.display()))?;
    let words = aligner.align(audio, &transcript)?;

    ensure_parent_dir(out_lrc)?;
    std::fs::write(out_lrc, write_lrc(&words))
        .with_context(|| format!("write lrc '{}'", out_lrc.display()))?;
    tracing::info!(path = %out_lrc.display(), words = words.len(), "lrc written");
    Ok(words.len())
}

#[cfg(test)]
#[path = "../../tests/unit/align/aligner.rs"]
mod tests;
