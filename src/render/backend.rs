/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The `premultiplied` flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)` as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Colors and shadow used when drawing words.
///
/// Glyph fill comes from the brush baked into the shaped layouts; see
/// [`ParleyMetrics::new`](crate::ParleyMetrics::new).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderStyle {
    /// Solid key color behind the text (RGBA8, straight alpha).
    pub background_rgba: [u8; 4],
    /// Shadow color (RGBA8, straight alpha).
    pub shadow_rgba: [u8; 4],
    /// Horizontal shadow offset in pixels.
    pub shadow_offset_px: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background_rgba: [0, 255, 0, 255],
            shadow_rgba: [255, 255, 255, 255],
            shadow_offset_px: 7.0,
        }
    }
}
