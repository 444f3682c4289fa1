//! Helper functions for CPU tensor operations
//!
//! Each submodule implements one operation family; this module holds the
//! shared validation and the element-wise kernels.

mod activation;
mod linalg;
mod matmul;
mod reduce;
mod shape;

pub(crate) use activation::{SoftmaxKind, softmax_impl};
pub(crate) use linalg::{TriangleKind, fill_diagonal_impl, triangle_impl};
pub(crate) use matmul::{bmm_impl, dot_impl, mm_impl, mv_impl};
pub(crate) use reduce::sum_impl;
pub(crate) use shape::{cat_impl, roll_impl, slice_scatter_impl};

use super::{CpuClient, CpuRuntime};
use crate::dims::infer_broadcast_shape;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::{BinaryOp, UnaryOp};
use crate::tensor::Tensor;

// ============================================================================
// Validation
// ============================================================================

/// Validate that two tensors have matching dtypes for binary operations.
#[inline]
pub(crate) fn validate_binary_dtypes(
    a: &Tensor<CpuRuntime>,
    b: &Tensor<CpuRuntime>,
) -> Result<DType> {
    if a.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            lhs: a.dtype(),
            rhs: b.dtype(),
        });
    }
    Ok(a.dtype())
}

/// Reject dtypes arithmetic is not defined for.
#[inline]
pub(crate) fn require_float(dtype: DType, op: &'static str) -> Result<()> {
    if dtype.is_float() {
        Ok(())
    } else {
        Err(Error::unsupported_dtype(dtype, op))
    }
}

/// Row-major strides (in elements) for a contiguous shape.
pub(crate) fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for d in (0..shape.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * shape[d + 1];
    }
    strides
}

// ============================================================================
// Element-wise Kernels
// ============================================================================

/// Helper for binary operations (add, sub, mul, div, pow, atan2)
pub(crate) fn binary_op_impl(
    client: &CpuClient,
    op: BinaryOp,
    a: &Tensor<CpuRuntime>,
    b: &Tensor<CpuRuntime>,
    op_name: &'static str,
) -> Result<Tensor<CpuRuntime>> {
    let dtype = validate_binary_dtypes(a, b)?;
    require_float(dtype, op_name)?;
    let out_shape = infer_broadcast_shape(a.shape(), b.shape())?;

    // Broadcast views have stride 0 along expanded dims, so reading them in
    // logical order repeats the broadcast values.
    let a_vals = a.broadcast_to(&out_shape)?.values();
    let b_vals = b.broadcast_to(&out_shape)?.values();
    let out = a_vals
        .iter()
        .zip(&b_vals)
        .map(|(&x, &y)| op.apply(x, y))
        .collect();

    Tensor::from_values(out, &out_shape, dtype, &client.device)
}

/// Helper for unary operations
pub(crate) fn unary_op_impl(
    client: &CpuClient,
    op: UnaryOp,
    a: &Tensor<CpuRuntime>,
    op_name: &'static str,
) -> Result<Tensor<CpuRuntime>> {
    require_float(a.dtype(), op_name)?;
    let out = a.values().into_iter().map(|x| op.apply(x)).collect();
    Tensor::from_values(out, a.shape(), a.dtype(), &client.device)
}

/// Helper for tensor-scalar operations
pub(crate) fn scalar_op_impl(
    client: &CpuClient,
    op: BinaryOp,
    a: &Tensor<CpuRuntime>,
    scalar: f64,
    op_name: &'static str,
) -> Result<Tensor<CpuRuntime>> {
    require_float(a.dtype(), op_name)?;
    let out = a.values().into_iter().map(|x| op.apply(x, scalar)).collect();
    Tensor::from_values(out, a.shape(), a.dtype(), &client.device)
}

/// Helper for `a == scalar`, producing a `Bool` tensor
pub(crate) fn eq_scalar_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    scalar: f64,
) -> Result<Tensor<CpuRuntime>> {
    let out = a
        .values()
        .into_iter()
        .map(|x| if x == scalar { 1.0 } else { 0.0 })
        .collect();
    Tensor::from_values(out, a.shape(), DType::Bool, &client.device)
}

/// Helper for `where(cond, x, y)` with three-way broadcasting
pub(crate) fn where_cond_impl(
    client: &CpuClient,
    cond: &Tensor<CpuRuntime>,
    x: &Tensor<CpuRuntime>,
    y: &Tensor<CpuRuntime>,
) -> Result<Tensor<CpuRuntime>> {
    let dtype = validate_binary_dtypes(x, y)?;
    let value_shape = infer_broadcast_shape(x.shape(), y.shape())?;
    let out_shape = infer_broadcast_shape(cond.shape(), &value_shape)?;

    let c = cond.broadcast_to(&out_shape)?.values();
    let xs = x.broadcast_to(&out_shape)?.values();
    let ys = y.broadcast_to(&out_shape)?.values();
    let out = c
        .iter()
        .zip(xs.iter().zip(&ys))
        .map(|(&c, (&x, &y))| if c != 0.0 { x } else { y })
        .collect();

    Tensor::from_values(out, &out_shape, dtype, &client.device)
}

/// Helper for dtype casts. Same-dtype casts return the input handle.
pub(crate) fn cast_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    dtype: DType,
) -> Result<Tensor<CpuRuntime>> {
    if a.dtype() == dtype {
        return Ok(a.clone());
    }
    Tensor::from_values(a.values(), a.shape(), dtype, &client.device)
}
