//! Word stream to lines, pages and placements.
//!
//! [`LyricLayout::build`] runs once per invocation. The result is immutable and `Sync`, so render
//! workers share it by reference while answering per-frame queries
//! ([`LyricLayout::visible_at`](crate::LyricLayout::visible_at)).

use crate::foundation::core::Canvas;
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::foundation::rng::RandomSource;
use crate::layout::justify::{Line, justify_lines};
use crate::layout::metrics::{TextMetrics, VerticalMetrics};
use crate::layout::paginate::{Page, PagePolicy, paginate};
use crate::layout::position::{WordPlacement, resolve_positions};
use crate::layout::token::TokenKind;
use crate::transcript::lrc::TimedWord;

/// Geometry and pagination inputs for [`LyricLayout::build`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    pub canvas: Canvas,
    /// Left and right margin in pixels.
    pub margin: f64,
    /// Extra vertical gap between lines in pixels.
    pub line_spacing: f64,
    /// Square size of pictogram tokens in pixels.
    pub pictogram_size: f64,
    pub page_policy: PagePolicy,
}

impl LayoutConfig {
    pub fn validate(&self) -> KaraokeResult<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(KaraokeError::validation("margin must be finite and >= 0"));
        }
        if 2.0 * self.margin >= f64::from(self.canvas.width) {
            return Err(KaraokeError::validation(
                "margins leave no horizontal room on the canvas",
            ));
        }
        if !self.line_spacing.is_finite() {
            return Err(KaraokeError::validation("line_spacing must be finite"));
        }
        if !self.pictogram_size.is_finite() || self.pictogram_size <= 0.0 {
            return Err(KaraokeError::validation(
                "pictogram_size must be finite and > 0",
            ));
        }
        self.page_policy.validate()
    }

    pub fn max_line_width(&self) -> f64 {
        f64::from(self.canvas.width) - 2.0 * self.margin
    }
}

/// Fully resolved lyric layout.
#[derive(Clone, Debug, serde::Serialize)]
pub struct LyricLayout {
    pub(crate) canvas: Canvas,
    pub(crate) vertical: VerticalMetrics,
    pub(crate) line_height: f64,
    pub(crate) line_spacing: f64,
    pub(crate) lines: Vec<Line>,
    pub(crate) pages: Vec<Page>,
    pub(crate) placements: Vec<WordPlacement>,
    #[serde(skip)]
    pub(crate) page_of_line: Vec<usize>,
}

impl LyricLayout {
    /// Justify, paginate and position `words`.
    ///
    /// Pictograms are measured at `pictogram_size` both when filling lines and when spreading
    /// them, so a line never holds more than fits.
    #[tracing::instrument(skip_all, fields(words = words.len()))]
    pub fn build(
        words: &[TimedWord],
        cfg: &LayoutConfig,
        metrics: &mut dyn TextMetrics,
        rng: &mut dyn RandomSource,
    ) -> KaraokeResult<Self> {
        cfg.validate()?;
        if let Some(bad) = words.iter().find(|w| !w.time.is_finite() || w.time < 0.0) {
            return Err(KaraokeError::validation(format!(
                "word '{}' has invalid time {}",
                bad.text, bad.time
            )));
        }

        let kinds: Vec<TokenKind> = words.iter().map(|w| TokenKind::classify(&w.text)).collect();
        let widths: Vec<f64> = words
            .iter()
            .zip(&kinds)
            .map(|(w, kind)| match kind {
                TokenKind::Pictogram => cfg.pictogram_size,
                TokenKind::GlyphRun => metrics.text_width(&w.text),
            })
            .collect();

        let lines = justify_lines(&widths, cfg.max_line_width(), metrics.space_width());
        let pages = paginate(lines.len(), &cfg.page_policy, rng)?;
        let placements = resolve_positions(
            words,
            &kinds,
            &widths,
            &lines,
            f64::from(cfg.canvas.width),
            cfg.margin,
        );

        let mut page_of_line = Vec::with_capacity(lines.len());
        for (page_idx, page) in pages.iter().enumerate() {
            if page.start_line != page_of_line.len() {
                return Err(KaraokeError::layout("pages do not partition lines"));
            }
            page_of_line.resize(page.end_line, page_idx);
        }
        if page_of_line.len() != lines.len() || placements.len() != words.len() {
            return Err(KaraokeError::layout("layout does not cover every word"));
        }

        let vertical = metrics.vertical();
        let line_height = vertical.ascent + vertical.descent + cfg.line_spacing;

        tracing::debug!(
            lines = lines.len(),
            pages = pages.len(),
            line_height,
            "layout built"
        );

        Ok(Self {
            canvas: cfg.canvas,
            vertical,
            line_height,
            line_spacing: cfg.line_spacing,
            lines,
            pages,
            placements,
            page_of_line,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn vertical(&self) -> VerticalMetrics {
        self.vertical
    }

    /// Ascent + descent + line spacing.
    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// One placement per input word, in input order.
    pub fn placements(&self) -> &[WordPlacement] {
        &self.placements
    }

    /// Index of the page holding `line`, if any.
    pub fn page_of_line(&self, line: usize) -> Option<usize> {
        self.page_of_line.get(line).copied()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
