//! Error types for detpost.

use thiserror::Error;

/// Result alias for detpost operations.
pub type DetPostResult<T> = std::result::Result<T, DetPostError>;

/// Errors that can occur while post-processing detector output.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DetPostError {
    /// The buffer length disagrees with the declared `[batch, rows, stride]` shape.
    #[error("shape mismatch: dims {dims:?} require {expected} values, got {len}")]
    ShapeMismatch {
        dims: [usize; 3],
        expected: usize,
        len: usize,
    },
    /// The shape itself cannot describe a detector output.
    #[error("invalid shape: {reason}")]
    InvalidShape { reason: &'static str },
    /// A threshold is not a finite value in `[0, 1]`.
    #[error("invalid threshold {name}: {value} is outside [0, 1]")]
    InvalidThreshold { name: &'static str, value: f32 },
    /// A letterbox ratio is not a finite positive value.
    #[error("invalid ratio {name}: {value} must be finite and positive")]
    InvalidRatio { name: &'static str, value: f32 },
    #[error("index {index} out of bounds for {context} (len {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        context: &'static str,
    },
    /// Image decoding failed (only produced with the `image-io` feature).
    #[error("image io failed: {reason}")]
    ImageIo { reason: String },
}
