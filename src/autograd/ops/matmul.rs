//! Backward implementations for matrix multiplication
//!
//! Implements gradient computation for `mm` (with a scaling factor, as used
//! by `addmm`) and for the rank-polymorphic [`crate::ops::matmul`].

use crate::autograd::{GradFn, single_grad};
use crate::dims::reduce_to_shape;
use crate::error::{Error, Result};
use crate::ops::{MatmulOps, MatmulStrategy, ScalarOps, TensorOps, matmul};
use crate::runtime::Runtime;
use crate::tensor::Tensor;
use tracing::trace_span;

/// Whether a 2-D layout is column-major (a transposed contiguous matrix)
#[inline]
fn is_column_major(sizes: &[usize], strides: &[isize]) -> bool {
    strides[0] == 1 && strides[1] == sizes[0] as isize
}

fn require_matrix(sizes: &[usize], strides: &[isize], arg: &'static str) -> Result<()> {
    if sizes.len() != 2 || strides.len() != 2 {
        return Err(Error::invalid_argument(
            arg,
            format!("expected a 2-D matrix, got sizes {sizes:?} and strides {strides:?}"),
        ));
    }
    Ok(())
}

fn maybe_scale<R>(client: &R::Client, t: Tensor<R>, alpha: f64) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    if alpha == 1.0 {
        Ok(t)
    } else {
        client.mul_scalar(&t, alpha)
    }
}

/// Gradient of `alpha * mat1 @ mat2` with respect to `mat1`.
///
/// `grad @ mat2ᵀ`, computed as `(mat2 @ gradᵀ)ᵀ` when `mat1` is column-major
/// so the result comes back in `mat1`'s memory order.
///
/// # Errors
///
/// [`Error::SparseGradient`] if `mat1` is sparse.
pub fn mm_mat1_backward<R>(
    client: &R::Client,
    grad: &Tensor<R>,
    mat2: &Tensor<R>,
    mat1: &Tensor<R>,
    alpha: f64,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("mm_mat1_backward", alpha).entered();
    if mat1.is_sparse() {
        return Err(Error::SparseGradient {
            op: "mm_mat1_backward",
        });
    }
    require_matrix(mat1.shape(), mat1.strides(), "mat1")?;

    let out = if is_column_major(mat1.shape(), mat1.strides()) {
        client.mm(mat2, &grad.t()?)?.t()?
    } else {
        client.mm(grad, &mat2.t()?)?
    };
    maybe_scale(client, out, alpha)
}

/// Gradient of `alpha * mat1 @ mat2` with respect to `mat2`.
///
/// Only `mat2`'s sizes and strides are needed: `mat1ᵀ @ grad`, computed as
/// `(gradᵀ @ mat1)ᵀ` when `mat2` is column-major.
pub fn mm_mat2_backward<R>(
    client: &R::Client,
    grad: &Tensor<R>,
    mat1: &Tensor<R>,
    mat2_sizes: &[usize],
    mat2_strides: &[isize],
    alpha: f64,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("mm_mat2_backward", alpha).entered();
    require_matrix(mat2_sizes, mat2_strides, "mat2")?;

    let out = if is_column_major(mat2_sizes, mat2_strides) {
        client.mm(&grad.t()?, mat1)?.t()?
    } else {
        client.mm(&mat1.t()?, grad)?
    };
    maybe_scale(client, out, alpha)
}

/// Gradient of [`crate::ops::matmul`] for any supported rank pair.
///
/// Rank-1 operands are promoted to matrices and the dims the forward pass
/// dropped are re-inserted into `grad`. Both products then go through the
/// dispatcher, broadcast batch dims are summed away, and each gradient is
/// reshaped back to its input's shape.
pub fn matmul_backward<R>(
    client: &R::Client,
    grad: &Tensor<R>,
    input: &Tensor<R>,
    other: &Tensor<R>,
    mask: [bool; 2],
) -> Result<[Option<Tensor<R>>; 2]>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("matmul_backward", ?mask).entered();
    if !mask[0] && !mask[1] {
        return Ok([None, None]);
    }

    let rank1 = input.ndim();
    let rank2 = other.ndim();
    MatmulStrategy::select(rank1, rank2)?;

    let a = if rank1 == 1 {
        input.unsqueeze(0)?
    } else {
        input.clone()
    };
    let b = if rank2 == 1 {
        other.unsqueeze(-1)?
    } else {
        other.clone()
    };

    let mut g = grad.clone();
    if rank2 == 1 {
        g = g.unsqueeze(g.ndim() as isize)?;
    }
    if rank1 == 1 {
        g = g.unsqueeze(g.ndim() as isize - 1)?;
    }

    let grad_input = if mask[0] {
        let full = matmul(client, &g, &b.t()?)?;
        let reduced = reduce_to_shape(client, &full, a.shape())?;
        Some(reduced.reshape(input.shape())?)
    } else {
        None
    };
    let grad_other = if mask[1] {
        let full = matmul(client, &a.t()?, &g)?;
        let reduced = reduce_to_shape(client, &full, b.shape())?;
        Some(reduced.reshape(other.shape())?)
    } else {
        None
    };

    Ok([grad_input, grad_other])
}

// ============================================================================
// MmBackward
// ============================================================================

/// Backward for `alpha * mat1 @ mat2` with 2-D operands
pub struct MmBackward<R: Runtime> {
    saved_tensors: Vec<Tensor<R>>, // [mat1, mat2]
    alpha: f64,
    mask: [bool; 2],
}

impl<R: Runtime> MmBackward<R> {
    /// Create a new MmBackward
    pub fn new(mat1: Tensor<R>, mat2: Tensor<R>, alpha: f64, mask: [bool; 2]) -> Self {
        Self {
            saved_tensors: vec![mat1, mat2],
            alpha,
            mask,
        }
    }
}

impl<R: Runtime> GradFn<R> for MmBackward<R>
where
    R::Client: TensorOps<R>,
{
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        let Some(grad) = single_grad(grad_outputs) else {
            return Ok(vec![None, None]);
        };
        let client = R::default_client(grad.device());
        let mat1 = &self.saved_tensors[0];
        let mat2 = &self.saved_tensors[1];

        let grad_mat1 = if self.mask[0] {
            Some(mm_mat1_backward(&client, grad, mat2, mat1, self.alpha)?)
        } else {
            None
        };
        let grad_mat2 = if self.mask[1] {
            Some(mm_mat2_backward(
                &client,
                grad,
                mat1,
                mat2.shape(),
                mat2.strides(),
                self.alpha,
            )?)
        } else {
            None
        };
        Ok(vec![grad_mat1, grad_mat2])
    }

    fn saved_tensors(&self) -> &[Tensor<R>] {
        &self.saved_tensors
    }

    fn name(&self) -> &'static str {
        "MmBackward"
    }
}

// ============================================================================
// MatmulBackward
// ============================================================================

/// Backward for `a @ b` with any supported rank pair
pub struct MatmulBackward<R: Runtime> {
    saved_tensors: Vec<Tensor<R>>, // [a, b]
    mask: [bool; 2],
}

impl<R: Runtime> MatmulBackward<R> {
    /// Create a new MatmulBackward
    pub fn new(a: Tensor<R>, b: Tensor<R>, mask: [bool; 2]) -> Self {
        Self {
            saved_tensors: vec![a, b],
            mask,
        }
    }
}

impl<R: Runtime> GradFn<R> for MatmulBackward<R>
where
    R::Client: TensorOps<R>,
{
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        let Some(grad) = single_grad(grad_outputs) else {
            return Ok(vec![None, None]);
        };
        let client = R::default_client(grad.device());
        let grads = matmul_backward(
            &client,
            grad,
            &self.saved_tensors[0],
            &self.saved_tensors[1],
            self.mask,
        )?;
        Ok(grads.into())
    }

    fn saved_tensors(&self) -> &[Tensor<R>] {
        &self.saved_tensors
    }

    fn name(&self) -> &'static str {
        "MatmulBackward"
    }
}
