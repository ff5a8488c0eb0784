//! Karaoke lyric video engine.
//!
//! Word-timed transcripts become justified, paginated on-screen text that is revealed word by
//! word in sync with an audio track:
//!
//! - Parse a `[MM:SS.ff]word` transcript into [`TimedWord`]s
//! - Build a [`LyricLayout`] (lines, pages, placements) with a [`TextMetrics`] implementation
//! - Query [`LyricLayout::visible_at`] per playback instant
//! - Prepare a [`PreparedWordStore`] and stream frames into a [`FrameSink`] with [`render_range`]
//!
//! Media helpers wrap the system `ffmpeg`/`ffprobe` for audio trimming and chroma-key overlay.
#![forbid(unsafe_code)]

mod align;
mod assets;
mod config;
mod foundation;
mod layout;
mod media;
mod timing;
mod transcript;

/// Encoding sinks.
pub mod encode;
pub(crate) mod render;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Point};
pub use crate::foundation::error::{KaraokeError, KaraokeResult};
pub use crate::foundation::rng::{RandomSource, Rng64, clock_seed};

pub use crate::timing::timecode::{
    format_display_timestamp, parse_display_timestamp, parse_trim_timecode,
};
pub use crate::transcript::lrc::{TimedWord, parse_lrc_words, read_lrc_words, write_lrc};

pub use crate::layout::engine::{LayoutConfig, LyricLayout};
pub use crate::layout::fingerprint::FrameFingerprint;
pub use crate::layout::justify::{Line, justify_lines};
pub use crate::layout::metrics::{TextMetrics, VerticalMetrics};
pub use crate::layout::paginate::{Page, PagePolicy, paginate};
pub use crate::layout::position::{WordPlacement, resolve_positions};
pub use crate::layout::token::{TokenKind, is_pictogram_codepoint, pictogram_asset_name};
pub use crate::layout::visibility::{DrawInstruction, FrameView};

pub use crate::assets::decode::{PreparedImage, decode_image, decode_image_fit_height};
pub use crate::assets::font::{FontFace, ParleyMetrics};
pub use crate::assets::pictogram::PictogramResolver;
pub use crate::assets::store::PreparedWordStore;

pub use crate::encode::ffmpeg::{FfmpegSink, encode_log_path, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::backend::{FrameRGBA, RenderStyle};
pub use crate::render::cpu::CpuFrameRenderer;
pub use crate::render::pipeline::{
    RenderOpts, RenderStats, RenderThreading, render_frame_at, render_range,
};

pub use crate::align::aligner::{AlignedWord, ExternalAligner, ForcedAligner, generate_lrc};
pub use crate::config::KaraokeConfig;
pub use crate::media::chroma::{ChromaOutcome, ChromaParams, overlay_chroma};
pub use crate::media::probe::{MediaInfo, probe_duration, probe_media};
pub use crate::media::trim::{TrimRange, trim_audio};
