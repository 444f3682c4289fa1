//! Error types for numgrad

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using numgrad's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while evaluating shape algebra, the matmul
/// dispatcher, or a backward formula
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Two shapes disagree on a non-1 dimension
    #[error(
        "Cannot broadcast shapes: size {lhs} does not match size {rhs} at dimension {dim}"
    )]
    BroadcastError {
        /// Dimension index in the broadcast (right-aligned) result
        dim: usize,
        /// Size on the left-hand side
        lhs: usize,
        /// Size on the right-hand side
        rhs: usize,
    },

    /// Dimension index out of range after wrapping
    #[error("Dimension out of range: {dim} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The dimension as passed by the caller
        dim: isize,
        /// Number of dimensions
        ndim: usize,
    },

    /// The same dimension appears twice in a dimension list
    #[error("Dimension {dim} appears multiple times in the list of dims")]
    DuplicateDimension {
        /// Wrapped dimension index
        dim: usize,
    },

    /// Rank exceeds what a dimension bitset can hold
    #[error("Tensor with {ndim} dimensions exceeds the supported maximum of {max}")]
    TooManyDimensions {
        /// Requested rank
        ndim: usize,
        /// Supported maximum
        max: usize,
    },

    /// Operands have a rank the operation cannot accept
    #[error("{op}: both arguments need to be at least 1D, but they are {lhs}D and {rhs}D")]
    InvalidRank {
        /// The operation name
        op: &'static str,
        /// Rank of the first operand
        lhs: usize,
        /// Rank of the second operand
        rhs: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// The forward pass was run in a configuration that discarded what the
    /// backward formula needs
    #[error("{op}: unsupported configuration: {reason}")]
    UnsupportedConfiguration {
        /// The operation name
        op: &'static str,
        /// Why the configuration cannot be differentiated
        reason: String,
    },

    /// A gradient was requested for a sparse operand that cannot receive one
    #[error("{op}: calculating the gradient of a sparse tensor argument is not supported")]
    SparseGradient {
        /// The operation name
        op: &'static str,
    },

    /// DType mismatch between operands
    #[error("DType mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// Left-hand side dtype
        lhs: DType,
        /// Right-hand side dtype
        rhs: DType,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// Tensor is not contiguous when contiguous memory is required
    #[error("Operation requires contiguous tensor")]
    NotContiguous,

    /// Backend limitation - operation valid but exceeds backend capabilities
    #[error("{backend} limitation: {operation} - {reason}")]
    BackendLimitation {
        /// The backend that has the limitation
        backend: &'static str,
        /// The operation being attempted
        operation: &'static str,
        /// Description of the limitation
        reason: String,
    },
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Create a backend limitation error
    pub fn backend_limitation(
        backend: &'static str,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::BackendLimitation {
            backend,
            operation,
            reason: reason.into(),
        }
    }
}
