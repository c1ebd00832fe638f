//! Error type for dense_tensors

use thiserror::Error;

/// Result type alias using `TensorError`
pub type Result<T> = std::result::Result<T, TensorError>;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum TensorError {
    /// A span was built with a zero step over a non-degenerate range
    #[error("cannot have a zero step in span [{first}:0:{last}]")]
    InvalidSpan { first: isize, last: isize },

    /// The number of indices does not match the tensor rank
    #[error("number of provided indices ({got}) does not match tensor order ({expected})")]
    ArityMismatch { expected: usize, got: usize },

    /// A flat storage offset fell outside the storage
    #[error("storage index {index} out of range for storage of size {size}")]
    OutOfRange { index: isize, size: usize },

    /// A dimension was queried past the tensor rank
    #[error("dimension {dim} out of range for tensor of rank {rank}")]
    DimensionOutOfRange { dim: usize, rank: usize },

    /// A span selects coordinates outside its dimension
    #[error("span selects indices outside dimension {dim} of extent {extent}")]
    SpanOutOfBounds { dim: usize, extent: usize },

    /// Operand extents do not conform
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },

    /// A permuted layout is not a permutation of the dimensions
    #[error("layout order {order:?} is not a permutation of the dimensions")]
    InvalidLayout { order: Vec<usize> },

    /// Data vector length does not match the product of the extents
    #[error("data of length {got} cannot fill a tensor of {expected} elements")]
    DataLength { expected: usize, got: usize },
}

impl TensorError {
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        TensorError::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }
}
