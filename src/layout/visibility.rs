use crate::foundation::core::Point;
use crate::layout::engine::LyricLayout;
use crate::layout::fingerprint::{FrameFingerprint, StableHasher};
use crate::layout::token::TokenKind;

/// One word to draw. `origin` is the top-left of the word's line box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawInstruction<'a> {
    /// Index of the word in the input stream.
    pub word: usize,
    pub origin: Point,
    pub text: &'a str,
    pub kind: TokenKind,
}

/// What is on screen at one playback instant.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameView<'a> {
    /// Active page, `None` for a blank frame.
    pub page: Option<usize>,
    /// Visible words of the active page, in word order.
    pub draws: Vec<DrawInstruction<'a>>,
    pub fingerprint: FrameFingerprint,
}

impl FrameView<'_> {
    pub fn is_blank(&self) -> bool {
        self.draws.is_empty()
    }
}

impl LyricLayout {
    /// Resolve the words visible at `t` seconds.
    ///
    /// The active page is the one holding the line of the highest-index revealed word. Revealed
    /// words on other pages are not drawn. Nothing revealed yields a blank view.
    pub fn visible_at(&self, t: f64) -> FrameView<'_> {
        let last_visible = self
            .placements
            .iter()
            .rposition(|p| p.time <= t);

        let Some(page_idx) = last_visible
            .and_then(|i| self.placements.get(i))
            .and_then(|p| self.page_of_line(p.line))
        else {
            return blank_view();
        };
        let Some(page) = self.pages.get(page_idx).copied() else {
            return blank_view();
        };

        let rows = page.line_count() as f64;
        let total = self.line_height * rows - self.line_spacing;
        let y0 = ((f64::from(self.canvas.height) - total) / 2.0).floor();

        let mut h = StableHasher::new();
        h.write_u8(1);
        h.write_u64(page_idx as u64);

        let mut draws = Vec::new();
        for (i, p) in self.placements.iter().enumerate() {
            if p.time > t || !page.contains_line(p.line) {
                continue;
            }
            let y = y0 + (p.line - page.start_line) as f64 * self.line_height;
            draws.push(DrawInstruction {
                word: i,
                origin: Point::new(p.x, y),
                text: &p.text,
                kind: p.kind,
            });
            h.write_u64(i as u64);
        }

        FrameView {
            page: Some(page_idx),
            draws,
            fingerprint: h.finish(),
        }
    }
}

fn blank_view() -> FrameView<'static> {
    let mut h = StableHasher::new();
    h.write_u8(0);
    FrameView {
        page: None,
        draws: Vec::new(),
        fingerprint: h.finish(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/visibility.rs"]
mod tests;
