/// Font-wide vertical metrics in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VerticalMetrics {
    /// Distance from the top of a line box to the baseline.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of a line box.
    pub descent: f64,
}

/// Measurement collaborator used by the layout engine.
///
/// Implementations may cache shaping work, hence `&mut self` on [`TextMetrics::text_width`].
pub trait TextMetrics {
    /// Advance width of `token` in pixels.
    fn text_width(&mut self, token: &str) -> f64;

    /// Width of the inter-word separator used while filling lines.
    fn space_width(&mut self) -> f64;

    /// Font-wide vertical metrics.
    fn vertical(&self) -> VerticalMetrics;
}
