//! JSON configuration for the `karaoke` pipeline.
//!
//! Every field has a default, so `{}` is a valid configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::layout::engine::LayoutConfig;
use crate::layout::paginate::PagePolicy;
use crate::media::chroma::ChromaParams;
use crate::render::backend::RenderStyle;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KaraokeConfig {
    pub width: u32,
    pub height: u32,
    /// Left and right margin in pixels.
    pub margin: f64,
    /// Font size in pixels.
    pub font_size: f64,
    pub line_spacing: f64,
    /// Pictogram square size; defaults to `font_size`.
    pub pictogram_size: Option<f64>,
    pub fps: u32,
    pub text_rgba: [u8; 4],
    pub shadow_rgba: [u8; 4],
    pub shadow_offset_px: f64,
    pub background_rgba: [u8; 4],
    pub page_line_counts: Vec<usize>,
    /// Pagination seed; taken from the clock when absent.
    pub seed: Option<u64>,
    pub font_path: Option<PathBuf>,
    pub pictogram_dir: Option<PathBuf>,
    pub chroma: ChromaParams,
}

impl Default for KaraokeConfig {
    fn default() -> Self {
        let style = RenderStyle::default();
        Self {
            width: 1080,
            height: 1080,
            margin: 0.0,
            font_size: 110.0,
            line_spacing: 80.0,
            pictogram_size: None,
            fps: 60,
            text_rgba: [0, 0, 0, 255],
            shadow_rgba: style.shadow_rgba,
            shadow_offset_px: style.shadow_offset_px,
            background_rgba: style.background_rgba,
            page_line_counts: PagePolicy::default().counts().to_vec(),
            seed: None,
            font_path: None,
            pictogram_dir: None,
            chroma: ChromaParams::default(),
        }
    }
}

impl KaraokeConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> KaraokeResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| KaraokeError::validation(format!("parse config JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> KaraokeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            KaraokeError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> KaraokeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(KaraokeError::validation("width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(KaraokeError::validation(
                "width/height must be even for yuv420p output",
            ));
        }
        if self.fps == 0 {
            return Err(KaraokeError::validation("fps must be non-zero"));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(KaraokeError::validation("font_size must be > 0"));
        }
        if !self.shadow_offset_px.is_finite() {
            return Err(KaraokeError::validation("shadow_offset_px must be finite"));
        }
        if self.background_rgba[3] != u8::MAX {
            return Err(KaraokeError::validation("background_rgba must be opaque"));
        }
        self.chroma.validate()?;
        self.layout_config()?.validate()
    }

    pub fn canvas(&self) -> KaraokeResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    pub fn fps(&self) -> KaraokeResult<Fps> {
        Fps::new(self.fps, 1)
    }

    pub fn page_policy(&self) -> KaraokeResult<PagePolicy> {
        PagePolicy::new(self.page_line_counts.iter().copied())
    }

    pub fn pictogram_size(&self) -> f64 {
        self.pictogram_size.unwrap_or(self.font_size)
    }

    pub fn layout_config(&self) -> KaraokeResult<LayoutConfig> {
        Ok(LayoutConfig {
            canvas: self.canvas()?,
            margin: self.margin,
            line_spacing: self.line_spacing,
            pictogram_size: self.pictogram_size(),
            page_policy: self.page_policy()?,
        })
    }

    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            background_rgba: self.background_rgba,
            shadow_rgba: self.shadow_rgba,
            shadow_offset_px: self.shadow_offset_px,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
