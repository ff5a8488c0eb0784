/// How a token is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Shaped with the configured font.
    GlyphRun,
    /// Drawn from a pre-rendered image asset at a fixed square size.
    Pictogram,
}

impl TokenKind {
    /// Classify a token. Pictogram iff non-empty and every code point is pictographic.
    pub fn classify(token: &str) -> Self {
        if !token.is_empty() && token.chars().all(is_pictogram_codepoint) {
            Self::Pictogram
        } else {
            Self::GlyphRun
        }
    }
}

/// Letterlike symbols through enclosed CJK, plus the supplementary emoji planes.
pub fn is_pictogram_codepoint(ch: char) -> bool {
    matches!(u32::from(ch), 0x2100..=0x32FF | 0x1F000..=0x1FAFF)
}

/// Asset file name for a pictogram token: remaining code points as lowercase hex joined by `-`,
/// with `.png` appended.
///
/// Variation selectors, zero-width joiners and other control or format code points are dropped.
pub fn pictogram_asset_name(token: &str) -> String {
    let mut out = String::new();
    for ch in token.chars().filter(|&ch| !is_ignorable_codepoint(ch)) {
        if !out.is_empty() {
            out.push('-');
        }
        out.push_str(&format!("{:x}", u32::from(ch)));
    }
    out.push_str(".png");
    out
}

fn is_ignorable_codepoint(ch: char) -> bool {
    let cp = u32::from(ch);
    ch.is_control()
        || matches!(
            cp,
            0xFE00..=0xFE0F
                | 0x00AD
                | 0x061C
                | 0x180E
                | 0x200B..=0x200F
                | 0x202A..=0x202E
                | 0x2060..=0x2064
                | 0x2066..=0x206F
                | 0xFEFF
                | 0xFFF9..=0xFFFB
                | 0xE0001
                | 0xE0020..=0xE007F
        )
}

#[cfg(test)]
#[path = "../../tests/unit/layout/token.rs"]
mod tests;
