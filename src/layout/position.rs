use crate::layout::justify::Line;
use crate::layout::token::TokenKind;
use crate::transcript::lrc::TimedWord;

/// Horizontal placement of one word. The vertical position depends on the page being shown and is
/// resolved per frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WordPlacement {
    pub time: f64,
    pub text: String,
    /// Left edge in pixels.
    pub x: f64,
    /// Drawn width, clamped so the word ends at or before the right margin.
    pub width: f64,
    pub kind: TokenKind,
    /// Index of the line holding this word.
    pub line: usize,
}

/// Spread each line across the available width.
///
/// `widths[i]` is the width used for word `i` (fixed square size for pictograms). Words keep
/// their input order; the gap is the floor of the leftover width divided by the number of gaps.
pub fn resolve_positions(
    words: &[TimedWord],
    kinds: &[TokenKind],
    widths: &[f64],
    lines: &[Line],
    canvas_width: f64,
    margin: f64,
) -> Vec<WordPlacement> {
    let avail = canvas_width - 2.0 * margin;
    let right = canvas_width - margin;
    let mut out = Vec::with_capacity(words.len());

    for (line_idx, line) in lines.iter().enumerate() {
        let line_widths = &widths[line.start..line.end];
        let total: f64 = line_widths.iter().sum();
        let gaps = line.len().saturating_sub(1).max(1) as f64;
        let space = ((avail - total) / gaps).floor().max(0.0);

        let mut x = margin;
        for i in line.start..line.end {
            let width = widths[i].min(right - x).max(0.0);
            out.push(WordPlacement {
                time: words[i].time,
                text: words[i].text.clone(),
                x,
                width,
                kind: kinds[i],
                line: line_idx,
            });
            x += width + space;
        }
    }

    out
}

#[cfg(test)]
#[path = "../../tests/unit/layout/position.rs"]
mod tests;
