use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::font::{FontFace, ParleyMetrics, TextBrushRgba8};
use crate::assets::pictogram::PictogramResolver;
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::layout::engine::LyricLayout;
use crate::layout::token::TokenKind;

/// Drawable form of one distinct token.
#[derive(Clone)]
pub(crate) enum WordArt {
    /// Shaped text, drawn with a shadow.
    Glyphs(Arc<parley::Layout<TextBrushRgba8>>),
    /// Pictogram image already scaled to the pictogram size.
    Image(PreparedImage),
}

/// Immutable store of drawable word art, one entry per distinct token.
///
/// This front-loads shaping and image IO so per-frame rendering stays IO-free and can be shared
/// read-only across render workers.
pub struct PreparedWordStore {
    font: vello_cpu::peniko::FontData,
    arts: Vec<WordArt>,
    ids_by_key: HashMap<(TokenKind, String), usize>,
    art_by_word: Vec<usize>,
    pictogram_fallbacks: usize,
}

impl PreparedWordStore {
    /// Prepare art for every placement in `layout`.
    ///
    /// Pictograms without a usable asset are shaped as text instead.
    #[tracing::instrument(skip_all, fields(words = layout.placements().len()))]
    pub fn prepare(
        layout: &LyricLayout,
        face: &FontFace,
        metrics: &mut ParleyMetrics,
        pictograms: &PictogramResolver,
    ) -> KaraokeResult<Self> {
        let mut out = Self {
            font: face.font_data(),
            arts: Vec::new(),
            ids_by_key: HashMap::new(),
            art_by_word: Vec::with_capacity(layout.placements().len()),
            pictogram_fallbacks: 0,
        };

        for p in layout.placements() {
            let key = (p.kind, p.text.clone());
            if let Some(&id) = out.ids_by_key.get(&key) {
                out.art_by_word.push(id);
                continue;
            }

            let art = match p.kind {
                TokenKind::Pictogram => match pictograms.resolve(&p.text) {
                    Some(img) => WordArt::Image(img),
                    None => {
                        out.pictogram_fallbacks += 1;
                        WordArt::Glyphs(metrics.shaped(&p.text))
                    }
                },
                TokenKind::GlyphRun => WordArt::Glyphs(metrics.shaped(&p.text)),
            };

            let id = out.arts.len();
            out.arts.push(art);
            out.ids_by_key.insert(key, id);
            out.art_by_word.push(id);
        }

        tracing::debug!(
            distinct = out.arts.len(),
            pictogram_fallbacks = out.pictogram_fallbacks,
            "word art prepared"
        );
        Ok(out)
    }

    pub(crate) fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Art id for the word at `word` in the input stream.
    pub(crate) fn id_for_word(&self, word: usize) -> KaraokeResult<usize> {
        self.art_by_word
            .get(word)
            .copied()
            .ok_or_else(|| KaraokeError::layout(format!("no prepared art for word {word}")))
    }

    pub(crate) fn get(&self, id: usize) -> KaraokeResult<&WordArt> {
        self.arts
            .get(id)
            .ok_or_else(|| KaraokeError::layout(format!("unknown word art id {id}")))
    }

    /// Number of distinct prepared tokens.
    pub fn len(&self) -> usize {
        self.arts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arts.is_empty()
    }

    /// Pictogram tokens drawn as text because no asset was usable.
    pub fn pictogram_fallbacks(&self) -> usize {
        self.pictogram_fallbacks
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
