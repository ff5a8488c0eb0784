use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::foundation::rng::RandomSource;

/// Half-open range `[start_line, end_line)` of lines shown together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Page {
    /// First line index.
    pub start_line: usize,
    /// One past the last line index.
    pub end_line: usize,
}

impl Page {
    pub fn line_count(self) -> usize {
        self.end_line - self.start_line
    }

    pub fn contains_line(self, line: usize) -> bool {
        self.start_line <= line && line < self.end_line
    }
}

/// Allowed per-page line counts.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PagePolicy {
    counts: Vec<usize>,
}

impl Default for PagePolicy {
    fn default() -> Self {
        Self {
            counts: vec![1, 2, 3],
        }
    }
}

impl PagePolicy {
    /// Policy from a list of allowed counts. Duplicates are dropped, order is kept.
    pub fn new(counts: impl IntoIterator<Item = usize>) -> KaraokeResult<Self> {
        let mut out = Vec::new();
        for c in counts {
            if !out.contains(&c) {
                out.push(c);
            }
        }
        let policy = Self { counts: out };
        policy.validate()?;
        Ok(policy)
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn validate(&self) -> KaraokeResult<()> {
        if self.counts.is_empty() {
            return Err(KaraokeError::validation(
                "page line counts must not be empty",
            ));
        }
        if self.counts.contains(&0) {
            return Err(KaraokeError::validation("page line counts must be >= 1"));
        }
        for (i, c) in self.counts.iter().enumerate() {
            if self.counts[..i].contains(c) {
                return Err(KaraokeError::validation(format!(
                    "page line count {c} listed more than once"
                )));
            }
        }
        Ok(())
    }
}

/// Group `line_count` lines into pages.
///
/// Each page draws its size uniformly from the allowed counts minus the previous page's choice.
/// The final page is clamped to the lines that remain.
pub fn paginate(
    line_count: usize,
    policy: &PagePolicy,
    rng: &mut dyn RandomSource,
) -> KaraokeResult<Vec<Page>> {
    policy.validate()?;

    let mut pages = Vec::new();
    let mut start = 0usize;
    let mut prev: Option<usize> = None;
    let mut choices = Vec::with_capacity(policy.counts.len());

    while start < line_count {
        choices.clear();
        choices.extend(
            policy
                .counts
                .iter()
                .copied()
                .filter(|&c| Some(c) != prev),
        );
        if choices.is_empty() {
            // Single allowed count: nothing else to alternate with.
            choices.extend_from_slice(&policy.counts);
        }

        let count = choices[rng.below(choices.len())];
        let end = (start + count).min(line_count);
        pages.push(Page {
            start_line: start,
            end_line: end,
        });
        prev = Some(count);
        start = end;
    }

    Ok(pages)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/paginate.rs"]
mod tests;
