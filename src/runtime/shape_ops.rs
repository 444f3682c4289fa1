//! Shared shape operation utilities for all backends
//!
//! This module provides common validation and zero-copy implementations
//! for shape operations (cat, split, chunk) that are identical across all
//! backends.
//!
//! # Design
//!
//! - Validation logic is implemented once here and used by all backends
//! - Zero-copy operations (split, split_with_sizes, chunk) are fully implemented here
//! - Copy operations (cat) use validation from here, with backend-specific kernels

use crate::dims::wrap_dim;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

// ============================================================================
// Cat Validation
// ============================================================================

/// A 1-D tensor of size zero. `cat` skips these regardless of the rank of
/// the other inputs, and their gradient is always an empty `[0]` tensor.
#[inline]
pub fn is_legacy_empty(shape: &[usize]) -> bool {
    shape == [0]
}

/// Parameters for cat operation after validation.
#[derive(Debug, Clone)]
pub struct CatParams {
    /// Indices of the inputs that take part (legacy empty tensors are skipped)
    pub inputs: Vec<usize>,
    /// Normalized dimension index
    pub dim_idx: usize,
    /// Data type of all tensors
    pub dtype: DType,
    /// Output shape
    pub out_shape: Vec<usize>,
    /// Product of dimensions before cat dimension (>= 1)
    pub outer_size: usize,
    /// Product of dimensions after cat dimension (>= 1)
    pub inner_size: usize,
}

/// Validate inputs for cat operation and compute output parameters.
///
/// This is the single source of truth for cat validation, used by all backends.
pub fn validate_cat<R: Runtime>(tensors: &[&Tensor<R>], dim: isize) -> Result<CatParams> {
    let first = tensors.first().ok_or_else(|| {
        Error::invalid_argument("tensors", "cat requires at least one tensor")
    })?;
    let dtype = first.dtype();
    for tensor in &tensors[1..] {
        if tensor.dtype() != dtype {
            return Err(Error::DTypeMismatch {
                lhs: dtype,
                rhs: tensor.dtype(),
            });
        }
    }

    let inputs: Vec<usize> = (0..tensors.len())
        .filter(|&i| !is_legacy_empty(tensors[i].shape()))
        .collect();

    let Some(&reference) = inputs.first() else {
        // Every input is a legacy empty tensor
        return Ok(CatParams {
            inputs,
            dim_idx: 0,
            dtype,
            out_shape: vec![0],
            outer_size: 1,
            inner_size: 1,
        });
    };

    let reference = tensors[reference];
    let ndim = reference.ndim();
    if ndim == 0 {
        return Err(Error::invalid_argument(
            "tensors",
            "cannot concatenate scalar tensors",
        ));
    }
    let dim_idx = wrap_dim(dim, ndim)?;

    // Validate all participating tensors agree except along the cat dimension
    let mut cat_dim_total = 0;
    for &i in &inputs {
        let tensor = tensors[i];
        let compatible = tensor.ndim() == ndim
            && tensor
                .shape()
                .iter()
                .zip(reference.shape())
                .enumerate()
                .all(|(d, (&a, &b))| d == dim_idx || a == b);
        if !compatible {
            return Err(Error::shape_mismatch(reference.shape(), tensor.shape()));
        }
        cat_dim_total += tensor.shape()[dim_idx];
    }

    let mut out_shape = reference.shape().to_vec();
    out_shape[dim_idx] = cat_dim_total;

    let outer_size: usize = out_shape[..dim_idx].iter().product();
    let inner_size: usize = out_shape[dim_idx + 1..].iter().product();

    Ok(CatParams {
        inputs,
        dim_idx,
        dtype,
        out_shape,
        outer_size: outer_size.max(1),
        inner_size: inner_size.max(1),
    })
}

// ============================================================================
// Split/Chunk (Zero-Copy, Backend-Agnostic)
// ============================================================================

/// How `chunk` divides a dimension
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkSplit {
    /// Equal pieces of this size; the last piece may be smaller
    Uniform(usize),
    /// Explicit piece sizes
    Sizes(Vec<usize>),
}

/// Piece sizes `chunk(size, chunks)` uses.
///
/// `split_size = ceil(size / chunks)`. A zero-size dimension still yields
/// `chunks` pieces (each of size zero), so that case returns explicit sizes.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `chunks <= 0`.
pub fn chunk_forward_sizes(size: usize, chunks: i64) -> Result<ChunkSplit> {
    if chunks <= 0 {
        return Err(Error::invalid_argument(
            "chunks",
            format!("chunk expects `chunks` to be greater than 0, got: {chunks}"),
        ));
    }
    let chunks = chunks as usize;
    let split_size = size.div_ceil(chunks);

    if split_size == 0 && size == 0 {
        let mut sizes = vec![split_size; chunks];
        sizes[chunks - 1] = size - split_size * (chunks - 1);
        return Ok(ChunkSplit::Sizes(sizes));
    }
    Ok(ChunkSplit::Uniform(split_size))
}

/// Split a tensor into pieces of `split_size` along a dimension.
///
/// This is a zero-copy operation that returns views into the original tensor.
/// The last piece holds the remainder; a zero-size dimension yields one empty
/// piece.
pub fn split<R: Runtime>(tensor: &Tensor<R>, split_size: usize, dim: isize) -> Result<Vec<Tensor<R>>> {
    if split_size == 0 {
        return Err(Error::invalid_argument(
            "split_size",
            "split_size must be greater than zero",
        ));
    }
    let dim_idx = wrap_dim(dim, tensor.ndim())?;
    let dim_size = tensor.shape()[dim_idx];
    let num_splits = dim_size.div_ceil(split_size).max(1);

    let mut result = Vec::with_capacity(num_splits);
    let mut start = 0;
    for _ in 0..num_splits {
        let length = split_size.min(dim_size - start);
        result.push(tensor.narrow(dim, start, length)?);
        start += length;
    }
    Ok(result)
}

/// Split a tensor into pieces of the given sizes along a dimension.
///
/// Zero-copy. The sizes must add up to the size of the dimension.
pub fn split_with_sizes<R: Runtime>(
    tensor: &Tensor<R>,
    split_sizes: &[usize],
    dim: isize,
) -> Result<Vec<Tensor<R>>> {
    let dim_idx = wrap_dim(dim, tensor.ndim())?;
    let dim_size = tensor.shape()[dim_idx];
    let total: usize = split_sizes.iter().sum();
    if total != dim_size {
        return Err(Error::invalid_argument(
            "split_sizes",
            format!(
                "split sizes {split_sizes:?} add up to {total}, expected the size of dimension {dim_idx} ({dim_size})"
            ),
        ));
    }

    let mut start = 0;
    split_sizes
        .iter()
        .map(|&length| {
            let piece = tensor.narrow(dim, start, length);
            start += length;
            piece
        })
        .collect()
}

/// Split a tensor into `chunks` pieces along a dimension.
///
/// Zero-copy. Piece sizes follow [`chunk_forward_sizes`], so fewer than
/// `chunks` pieces may come back when the dimension is small, except for a
/// zero-size dimension which always yields exactly `chunks` empty pieces.
pub fn chunk<R: Runtime>(tensor: &Tensor<R>, chunks: i64, dim: isize) -> Result<Vec<Tensor<R>>> {
    let dim_idx = wrap_dim(dim, tensor.ndim())?;
    match chunk_forward_sizes(tensor.shape()[dim_idx], chunks)? {
        ChunkSplit::Uniform(split_size) => split(tensor, split_size, dim),
        ChunkSplit::Sizes(sizes) => split_with_sizes(tensor, &sizes, dim),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_forward_sizes() {
        assert_eq!(chunk_forward_sizes(10, 3).unwrap(), ChunkSplit::Uniform(4));
        assert_eq!(chunk_forward_sizes(6, 3).unwrap(), ChunkSplit::Uniform(2));
        assert_eq!(chunk_forward_sizes(2, 5).unwrap(), ChunkSplit::Uniform(1));
        assert_eq!(
            chunk_forward_sizes(0, 3).unwrap(),
            ChunkSplit::Sizes(vec![0, 0, 0])
        );
    }

    #[test]
    fn test_chunk_forward_sizes_rejects_non_positive() {
        assert!(matches!(
            chunk_forward_sizes(4, 0),
            Err(Error::InvalidArgument { arg: "chunks", .. })
        ));
        assert!(chunk_forward_sizes(4, -2).is_err());
    }

    #[test]
    fn test_legacy_empty() {
        assert!(is_legacy_empty(&[0]));
        assert!(!is_legacy_empty(&[0, 3]));
        assert!(!is_legacy_empty(&[]));
    }

    #[cfg(feature = "cpu")]
    mod cpu {
        use super::*;
        use crate::runtime::cpu::{CpuDevice, CpuRuntime};

        #[test]
        fn test_split_views() {
            let device = CpuDevice::new();
            let data: Vec<f64> = (0..10).map(|i| i as f64).collect();
            let t = Tensor::<CpuRuntime>::from_slice(&data, &[10], &device);
            let pieces = split(&t, 4, 0).unwrap();
            let sizes: Vec<usize> = pieces.iter().map(|p| p.shape()[0]).collect();
            assert_eq!(sizes, vec![4, 4, 2]);
            assert!(pieces[1].storage().ptr_eq(t.storage()));
            assert_eq!(pieces[2].to_vec::<f64>(), vec![8.0, 9.0]);
        }

        #[test]
        fn test_chunk_of_empty_dim() {
            let device = CpuDevice::new();
            let t = Tensor::<CpuRuntime>::zeros(&[0, 5], DType::F32, &device);
            let pieces = chunk(&t, 3, 0).unwrap();
            assert_eq!(pieces.len(), 3);
            for piece in &pieces {
                assert_eq!(piece.shape(), &[0, 5]);
            }
        }

        #[test]
        fn test_split_with_sizes_must_cover_dim() {
            let device = CpuDevice::new();
            let t = Tensor::<CpuRuntime>::zeros(&[2, 6], DType::F32, &device);
            let pieces = split_with_sizes(&t, &[1, 5], -1).unwrap();
            assert_eq!(pieces[1].shape(), &[2, 5]);
            assert!(matches!(
                split_with_sizes(&t, &[1, 4], -1),
                Err(Error::InvalidArgument { arg: "split_sizes", .. })
            ));
        }

        #[test]
        fn test_validate_cat_skips_legacy_empty() {
            let device = CpuDevice::new();
            let a = Tensor::<CpuRuntime>::zeros(&[2, 4], DType::F32, &device);
            let e = Tensor::<CpuRuntime>::zeros(&[0], DType::F32, &device);
            let b = Tensor::<CpuRuntime>::zeros(&[3, 4], DType::F32, &device);
            let params = validate_cat(&[&a, &e, &b], 0).unwrap();
            assert_eq!(params.inputs, vec![0, 2]);
            assert_eq!(params.out_shape, vec![5, 4]);
        }

        #[test]
        fn test_validate_cat_shape_mismatch() {
            let device = CpuDevice::new();
            let a = Tensor::<CpuRuntime>::zeros(&[2, 4], DType::F32, &device);
            let b = Tensor::<CpuRuntime>::zeros(&[2, 3], DType::F32, &device);
            assert!(matches!(
                validate_cat(&[&a, &b], 0),
                Err(Error::ShapeMismatch { .. })
            ));
            assert!(validate_cat(&[&a, &b], 1).is_ok());
        }
    }
}
