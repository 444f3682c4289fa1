//! Shape and dimension algebra
//!
//! Everything else in the crate depends on these helpers:
//!
//! - [`wrap_dim`]: normalize a possibly-negative dimension index
//! - [`infer_broadcast_shape`]: right-aligned broadcast of two shapes
//! - [`reduce_to_shape`]: sum a tensor down to a broadcast-compatible shape
//! - [`dims_to_bitset`]: validated set of reduction dimensions

mod sum_to;

pub use sum_to::reduce_to_shape;

use crate::error::{Error, Result};
use crate::tensor::Shape;

/// Largest rank a [`DimBitset`] can describe
pub const MAX_DIMS: usize = 64;

/// Normalize `dim` against `rank`.
///
/// Negative values count from the end (`-1` is the last dimension). The
/// result must lie in `[0, rank)`; a rank-0 tensor has no valid dimension.
///
/// # Example
/// ```
/// use numgrad::dims::wrap_dim;
/// assert_eq!(wrap_dim(-1, 3).unwrap(), 2);
/// assert!(wrap_dim(3, 3).is_err());
/// ```
#[inline]
pub fn wrap_dim(dim: isize, rank: usize) -> Result<usize> {
    let wrapped = if dim < 0 { dim + rank as isize } else { dim };
    if wrapped < 0 || wrapped >= rank as isize {
        return Err(Error::InvalidDimension { dim, ndim: rank });
    }
    Ok(wrapped as usize)
}

/// Broadcast shape of `a` and `b`.
///
/// Shapes are aligned at the trailing dimension; missing leading dimensions
/// count as 1. Each aligned pair must be equal or have exactly one side equal
/// to 1. Symmetric in its arguments.
///
/// # Errors
///
/// [`Error::BroadcastError`] naming the result dimension and both sizes.
pub fn infer_broadcast_shape(a: &[usize], b: &[usize]) -> Result<Shape> {
    let ndim = a.len().max(b.len());
    let mut result = Shape::with_capacity(ndim);
    result.resize(ndim, 0);

    for i in (0..ndim).rev() {
        let offset = ndim - 1 - i;
        let size_a = if offset < a.len() { a[a.len() - 1 - offset] } else { 1 };
        let size_b = if offset < b.len() { b[b.len() - 1 - offset] } else { 1 };

        result[i] = if size_a == size_b || size_b == 1 {
            size_a
        } else if size_a == 1 {
            size_b
        } else {
            return Err(Error::BroadcastError {
                dim: i,
                lhs: size_a,
                rhs: size_b,
            });
        };
    }

    Ok(result)
}

/// Fixed-capacity set of wrapped dimension indices (up to [`MAX_DIMS`])
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DimBitset(u64);

impl DimBitset {
    /// Empty set
    pub const fn new() -> Self {
        Self(0)
    }

    /// Whether `dim` is a member
    #[inline]
    pub fn contains(&self, dim: usize) -> bool {
        dim < MAX_DIMS && self.0 & (1u64 << dim) != 0
    }

    /// Insert `dim`; returns false if it was already present
    #[inline]
    fn insert(&mut self, dim: usize) -> bool {
        let bit = 1u64 << dim;
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    /// Number of members
    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..MAX_DIMS).filter(move |&d| self.contains(d))
    }
}

/// Wrap every entry of `dims` against `rank` and collect them into a set.
///
/// Duplicate dimensions (after wrapping) are a usage error, not silently
/// merged.
///
/// # Errors
///
/// - [`Error::TooManyDimensions`] if `rank > 64`
/// - [`Error::InvalidDimension`] for an out-of-range entry
/// - [`Error::DuplicateDimension`] for a repeated entry
pub fn dims_to_bitset(dims: &[isize], rank: usize) -> Result<DimBitset> {
    if rank > MAX_DIMS {
        return Err(Error::TooManyDimensions {
            ndim: rank,
            max: MAX_DIMS,
        });
    }
    let mut set = DimBitset::new();
    for &dim in dims {
        let wrapped = wrap_dim(dim, rank)?;
        if !set.insert(wrapped) {
            return Err(Error::DuplicateDimension { dim: wrapped });
        }
    }
    Ok(set)
}
