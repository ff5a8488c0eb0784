use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::layout::metrics::{TextMetrics, VerticalMetrics};

/// Separator run measured for line filling.
const SEPARATOR_RUN: &str = "  ";
/// Reference text for font-wide ascent/descent.
const VERTICAL_SAMPLE: &str = "Hg";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl TextBrushRgba8 {
    pub(crate) fn from_rgba(rgba: [u8; 4]) -> Self {
        let [r, g, b, a] = rgba;
        Self { r, g, b, a }
    }
}

/// A font file loaded from disk, at one pixel size.
#[derive(Clone, Debug)]
pub struct FontFace {
    path: PathBuf,
    bytes: Arc<Vec<u8>>,
    size_px: f32,
}

impl FontFace {
    /// Read a TrueType/OpenType font file.
    pub fn load(path: &Path, size_px: f32) -> KaraokeResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(path, bytes, size_px)
    }

    pub fn from_bytes(path: &Path, bytes: Vec<u8>, size_px: f32) -> KaraokeResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(KaraokeError::validation(
                "font size_px must be finite and > 0",
            ));
        }
        if bytes.is_empty() {
            return Err(KaraokeError::validation(format!(
                "font file '{}' is empty",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            bytes: Arc::new(bytes),
            size_px,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub(crate) fn font_data(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(self.bytes.as_ref().clone()),
            0,
        )
    }
}

/// Stateful helper for building Parley text layouts from one registered font.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    size_px: f32,
}

impl TextLayoutEngine {
    /// Register `face` with fresh Parley contexts.
    pub(crate) fn new(face: &FontFace) -> KaraokeResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(face.bytes().to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            KaraokeError::validation(format!(
                "no font families registered from '{}'",
                face.path().display()
            ))
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| KaraokeError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            size_px: face.size_px(),
        })
    }

    /// Shape `text` on a single unbroken line.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    pub(crate) fn family_name(&self) -> &str {
        &self.family_name
    }
}

/// [`TextMetrics`] backed by Parley shaping.
///
/// Every shaped token is cached, so the layouts measured while justifying are the ones later
/// drawn.
pub struct ParleyMetrics {
    engine: TextLayoutEngine,
    brush: TextBrushRgba8,
    shaped: HashMap<String, Arc<parley::Layout<TextBrushRgba8>>>,
    space_width: Option<f64>,
    vertical: VerticalMetrics,
}

impl ParleyMetrics {
    /// Metrics for `face`; glyph runs carry `text_rgba` as their brush.
    pub fn new(face: &FontFace, text_rgba: [u8; 4]) -> KaraokeResult<Self> {
        let mut engine = TextLayoutEngine::new(face)?;
        let brush = TextBrushRgba8::from_rgba(text_rgba);

        let sample = engine.layout_plain(VERTICAL_SAMPLE, brush);
        let vertical = sample
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                VerticalMetrics {
                    ascent: f64::from(m.ascent),
                    descent: f64::from(m.descent),
                }
            })
            .ok_or_else(|| {
                KaraokeError::validation(format!(
                    "font '{}' produced no line metrics",
                    face.path().display()
                ))
            })?;

        tracing::debug!(
            family = engine.family_name(),
            size_px = face.size_px(),
            ascent = vertical.ascent,
            descent = vertical.descent,
            "font registered"
        );

        Ok(Self {
            engine,
            brush,
            shaped: HashMap::new(),
            space_width: None,
            vertical,
        })
    }

    /// Shaped layout for `token`, cached.
    pub(crate) fn shaped(&mut self, token: &str) -> Arc<parley::Layout<TextBrushRgba8>> {
        if let Some(layout) = self.shaped.get(token) {
            return Arc::clone(layout);
        }
        let layout = Arc::new(self.engine.layout_plain(token, self.brush));
        self.shaped.insert(token.to_owned(), Arc::clone(&layout));
        layout
    }
}

impl TextMetrics for ParleyMetrics {
    fn text_width(&mut self, token: &str) -> f64 {
        f64::from(self.shaped(token).full_width())
    }

    fn space_width(&mut self) -> f64 {
        if let Some(w) = self.space_width {
            return w;
        }
        let w = f64::from(self.engine.layout_plain(SEPARATOR_RUN, self.brush).full_width());
        self.space_width = Some(w);
        w
    }

    fn vertical(&self) -> VerticalMetrics {
        self.vertical
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
