//! Error types and result utilities for the voice-transform pipeline.

use thiserror::Error;

/// Convenience type alias for results that may contain [`TransformError`].
pub type TransformResult<T> = Result<T, TransformError>;

/// Error types that can occur while transforming a voice recording.
#[derive(Error, Debug)]
pub enum TransformError {
    /// The input bytes could not be decoded into audio samples.
    ///
    /// Raised for corrupt, truncated, or unsupported containers. Fatal for
    /// the call that produced it: no partial output is returned.
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Rendering the transformed signal failed.
    ///
    /// This typically happens when the output window would be empty or the
    /// filter cannot be designed for the clip's sample rate.
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid parameters were provided to an operation.
    ///
    /// This includes cases like a non-positive sample rate or an empty
    /// channel buffer. Out-of-range but finite transform parameters are
    /// *not* an error; callers clamp them at the UI boundary.
    #[error("Invalid parameter error: {0}")]
    InvalidParameter(String),

    /// Channel buffers disagree on length or count.
    #[error("Dimension mismatch error: {0}")]
    DimensionMismatch(String),
}
