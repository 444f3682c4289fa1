//! Backward implementations for reduction operations

use crate::autograd::{GradFn, single_grad};
use crate::dims::{dims_to_bitset, wrap_dim};
use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;
use tracing::trace_span;

/// Gradient of `sum(input, dims, keepdim)`: broadcast `grad` back to `sizes`.
///
/// Without `keepdim` the reduced dimensions are re-inserted first. A single
/// dim is unsqueezed directly; several dims are validated as a set (a
/// repeated dim is an error) and unsqueezed in ascending order. With
/// `keepdim`, or when `sizes` is a scalar shape, `grad` is expanded as is.
///
/// The result is a zero-copy broadcast view of `grad`.
pub fn sum_backward<R: Runtime>(
    grad: &Tensor<R>,
    sizes: &[usize],
    dims: &[isize],
    keepdim: bool,
) -> Result<Tensor<R>> {
    let _span = trace_span!("sum_backward", ?dims, keepdim).entered();
    if keepdim || sizes.is_empty() {
        return grad.broadcast_to(sizes);
    }

    let rank = sizes.len();
    let expanded = if let [dim] = dims {
        grad.unsqueeze(wrap_dim(*dim, rank)? as isize)?
    } else {
        let set = dims_to_bitset(dims, rank)?;
        let mut g = grad.clone();
        for d in set.iter() {
            g = g.unsqueeze(d as isize)?;
        }
        g
    };
    expanded.broadcast_to(sizes)
}

// ============================================================================
// SumBackward
// ============================================================================

/// Backward for sum reduction: z = sum(a, dims)
///
/// The gradient of sum is broadcast expansion.
/// For z = sum(a, dims), dL/da = broadcast(dL/dz, original_shape)
pub struct SumBackward {
    input_shape: Vec<usize>,
    dims: Vec<isize>,
    keepdim: bool,
}

impl SumBackward {
    /// Create a new SumBackward
    pub fn new(input_shape: &[usize], dims: &[isize], keepdim: bool) -> Self {
        Self {
            input_shape: input_shape.to_vec(),
            dims: dims.to_vec(),
            keepdim,
        }
    }
}

impl<R: Runtime> GradFn<R> for SumBackward {
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        let Some(grad) = single_grad(grad_outputs) else {
            return Ok(vec![None]);
        };
        let grad_input = sum_backward(grad, &self.input_shape, &self.dims, self.keepdim)?;
        Ok(vec![Some(grad_input)])
    }

    fn name(&self) -> &'static str {
        "SumBackward"
    }
}
