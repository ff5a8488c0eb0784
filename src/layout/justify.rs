/// Half-open range `[start, end)` of word indices that share one text line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Line {
    /// First word index.
    pub start: usize,
    /// One past the last word index.
    pub end: usize,
}

impl Line {
    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

/// Greedy first-fit line filling.
///
/// A word that cannot fit on an empty line is emitted alone on its own line.
pub fn justify_lines(widths: &[f64], max_width: f64, space_width: f64) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0usize;
    let mut current = 0.0f64;

    for (i, &w) in widths.iter().enumerate() {
        let non_empty = i > start;
        let candidate = current + if non_empty { space_width } else { 0.0 } + w;
        if candidate > max_width {
            if non_empty {
                lines.push(Line { start, end: i });
                start = i;
                current = w;
            } else {
                lines.push(Line { start: i, end: i + 1 });
                start = i + 1;
                current = 0.0;
            }
        } else {
            current = candidate;
        }
    }
    if start < widths.len() {
        lines.push(Line {
            start,
            end: widths.len(),
        });
    }

    lines
}

#[cfg(test)]
#[path = "../../tests/unit/layout/justify.rs"]
mod tests;
