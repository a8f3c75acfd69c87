//! Error type shared by every fallible filter entry point.

use std::collections::TryReserveError;

/// Result alias used throughout the crate.
pub type FilterResult<T> = Result<T, FilterError>;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// Input needs a batch axis, a channel axis and at least one spatial axis.
    #[error("Expected at least 3 axes (batch, channel, spatial...), got {rank}.")]
    RankTooLow { rank: usize },

    #[error("Axis {axis} has zero length.")]
    EmptyAxis { axis: usize },

    #[error("Invalid {name}: {value} (must be finite, greater than zero and large enough that 2*sigma^2 does not underflow).")]
    InvalidSigma { name: &'static str, value: f32 },

    #[error("Layout has {sizes} sizes but {strides} strides.")]
    StrideCountMismatch { sizes: usize, strides: usize },

    /// Raw layout reaches outside the buffer it describes.
    #[error("Layout addresses elements {min}..={max} but the buffer holds {len}.")]
    OutOfBounds { min: isize, max: isize, len: usize },

    #[error("Output shape {output:?} does not match input shape {input:?}.")]
    ShapeMismatch {
        input: Vec<usize>,
        output: Vec<usize>,
    },

    #[error("Output axis {axis} has stride 0, elements would overwrite each other.")]
    OverlappingOutput { axis: usize },

    #[error("Element count overflows usize.")]
    ShapeOverflow,

    #[error("Array memory cannot be addressed as a single strided buffer.")]
    UnsupportedLayout,

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Allocation(#[from] TryReserveError),
}
