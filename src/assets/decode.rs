use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::KaraokeResult;
use crate::foundation::math::premultiply_rgba8_in_place;

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> KaraokeResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(premultiplied(dyn_img.to_rgba8()))
}

/// Decode and resample (Lanczos) so the image is `height` pixels tall, keeping aspect ratio.
pub fn decode_image_fit_height(bytes: &[u8], height: u32) -> KaraokeResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (w, h) = rgba.dimensions();

    let scale = f64::from(height) / f64::from(h.max(1));
    let new_w = ((f64::from(w) * scale) as u32).max(1);
    let new_h = ((f64::from(h) * scale) as u32).max(1);
    if (new_w, new_h) == (w, h) {
        return Ok(premultiplied(rgba));
    }

    let resized =
        image::imageops::resize(&rgba, new_w, new_h, image::imageops::FilterType::Lanczos3);
    Ok(premultiplied(resized))
}

fn premultiplied(rgba: image::RgbaImage) -> PreparedImage {
    let (width, height) = rgba.dimensions();
    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
