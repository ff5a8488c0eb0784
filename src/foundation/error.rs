/// Convenience result type used across the crate.
pub type KaraokeResult<T> = Result<T, KaraokeError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum KaraokeError {
    /// Malformed timestamp or timecode text.
    #[error("format error: {0}")]
    Format(String),

    /// Invalid user-provided configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Layout structures that cannot be built from the given input.
    #[error("layout error: {0}")]
    Layout(String),

    /// Failure reported by an external collaborator (ffmpeg, ffprobe, aligner command).
    #[error("external tool error: {0}")]
    External(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KaraokeError {
    /// Build a [`KaraokeError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`KaraokeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`KaraokeError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`KaraokeError::External`] value.
    pub fn external(msg: impl Into<String>) -> Self {
        Self::External(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
