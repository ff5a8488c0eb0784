use std::path::PathBuf;

use crate::assets::decode::{PreparedImage, decode_image_fit_height};
use crate::layout::token::pictogram_asset_name;

/// Maps pictogram tokens to PNG files in an asset directory.
///
/// A missing or undecodable file is not an error: the caller draws the token as text instead.
#[derive(Clone, Debug)]
pub struct PictogramResolver {
    dir: Option<PathBuf>,
    size_px: u32,
}

impl PictogramResolver {
    /// Resolve from `dir`, scaling images to `size_px` tall.
    pub fn new(dir: impl Into<PathBuf>, size_px: u32) -> Self {
        Self {
            dir: Some(dir.into()),
            size_px: size_px.max(1),
        }
    }

    /// Resolver without an asset directory; every pictogram falls back to text.
    pub fn disabled() -> Self {
        Self {
            dir: None,
            size_px: 1,
        }
    }

    /// Candidate asset path for `token`.
    pub fn path_for(&self, token: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(pictogram_asset_name(token)))
    }

    /// Load the image for `token`, if an asset exists and decodes.
    pub fn resolve(&self, token: &str) -> Option<PreparedImage> {
        let path = self.path_for(token)?;
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no pictogram asset; drawing token as text");
            return None;
        }

        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read pictogram asset");
                return None;
            }
        };
        match decode_image_fit_height(&bytes, self.size_px) {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to decode pictogram asset");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/pictogram.rs"]
mod tests;
