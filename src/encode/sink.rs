use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::render::backend::FrameRGBA;

/// Lyric track geometry handed to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Song muxed under the lyrics (any format `ffmpeg` decodes).
    pub audio: Option<PathBuf>,
}

/// Consumer of a rendered lyric track.
///
/// [`render_range`](crate::render_range) calls `begin` once, then `push_frame` for every frame of
/// the range with consecutive indices, then `end`.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> KaraokeResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KaraokeResult<()>;
    fn end(&mut self) -> KaraokeResult<()>;
}

/// Enforces that pushed frames form one run without gaps or repeats.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FrameCursor {
    next: Option<u64>,
}

impl FrameCursor {
    pub(crate) fn advance(&mut self, idx: FrameIndex) -> KaraokeResult<()> {
        if let Some(next) = self.next
            && idx.0 != next
        {
            return Err(KaraokeError::validation(format!(
                "lyric track expected frame {next}, got {}",
                idx.0
            )));
        }
        self.next = Some(idx.0 + 1);
        Ok(())
    }
}

/// Keeps the whole lyric track in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    cursor: FrameCursor,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry captured by the last `begin`.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> KaraokeResult<()> {
        *self = Self {
            cfg: Some(cfg),
            ..Self::default()
        };
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KaraokeResult<()> {
        if self.cfg.is_none() || self.ended {
            return Err(KaraokeError::validation("in-memory sink is not open"));
        }
        self.cursor.advance(idx)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> KaraokeResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
