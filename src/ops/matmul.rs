//! Rank-polymorphic matrix multiplication
//!
//! [`matmul`] resolves any pair of ranks (both at least 1) into one of six
//! strategies built from the fixed-rank primitives in [`MatmulOps`]:
//!
//! | rank(t1) | rank(t2) | strategy |
//! |----------|----------|----------|
//! | 1        | 1        | [`MatmulStrategy::Dot`] |
//! | 2        | 1        | [`MatmulStrategy::Mv`] |
//! | 1        | 2        | [`MatmulStrategy::Vm`] |
//! | 2        | 2        | [`MatmulStrategy::Mm`] |
//! | >= 3     | 1 or 2   | [`MatmulStrategy::FoldedMm`] |
//! | otherwise|          | [`MatmulStrategy::BatchedMm`] |

use crate::dims::infer_broadcast_shape;
use crate::error::{Error, Result};
use crate::ops::MatmulOps;
use crate::runtime::Runtime;
use crate::tensor::Tensor;
use tracing::trace;

/// How a `t1 @ t2` pair is computed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatmulStrategy {
    /// Vector inner product, scalar result
    Dot,
    /// Matrix-vector product
    Mv,
    /// Vector-matrix product: unsqueeze(0), mm, squeeze(0)
    Vm,
    /// Plain matrix product
    Mm,
    /// Fold the leading dims of t1 into rows and use a single mm
    FoldedMm,
    /// Broadcast batch dims, flatten them and use bmm
    BatchedMm,
}

impl MatmulStrategy {
    /// Pick the strategy for operands of the given ranks.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRank`] if either rank is 0.
    pub fn select(rank1: usize, rank2: usize) -> Result<Self> {
        let strategy = match (rank1, rank2) {
            (0, _) | (_, 0) => {
                return Err(Error::InvalidRank {
                    op: "matmul",
                    lhs: rank1,
                    rhs: rank2,
                });
            }
            (1, 1) => Self::Dot,
            (2, 1) => Self::Mv,
            (1, 2) => Self::Vm,
            (2, 2) => Self::Mm,
            (r1, 1 | 2) if r1 >= 3 => Self::FoldedMm,
            _ => Self::BatchedMm,
        };
        Ok(strategy)
    }
}

/// Matrix product of two tensors of arbitrary rank (NumPy `matmul` semantics).
///
/// Rank-1 operands act as vectors and their dimension is dropped from the
/// result; leading batch dimensions broadcast.
///
/// # Errors
///
/// - [`Error::InvalidRank`] if either operand is a scalar
/// - [`Error::BroadcastError`] if the batch dimensions do not broadcast
/// - [`Error::ShapeMismatch`] (from the primitives) on an inner-dimension mismatch
///
/// # Example
///
/// ```
/// # use numgrad::prelude::*;
/// # use numgrad::ops::matmul;
/// let device = CpuDevice::new();
/// let client = CpuRuntime::default_client(&device);
/// let a = Tensor::<CpuRuntime>::ones(&[4, 2, 3], DType::F32, &device);
/// let b = Tensor::<CpuRuntime>::ones(&[3, 5], DType::F32, &device);
/// assert_eq!(matmul(&client, &a, &b)?.shape(), &[4, 2, 5]);
/// # Ok::<(), numgrad::error::Error>(())
/// ```
pub fn matmul<R>(client: &R::Client, t1: &Tensor<R>, t2: &Tensor<R>) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: MatmulOps<R>,
{
    let strategy = MatmulStrategy::select(t1.ndim(), t2.ndim())?;
    trace!(?strategy, lhs = ?t1.shape(), rhs = ?t2.shape(), "matmul dispatch");

    match strategy {
        MatmulStrategy::Dot => client.dot(t1, t2),
        MatmulStrategy::Mv => client.mv(t1, t2),
        MatmulStrategy::Vm => Ok(client.mm(&t1.unsqueeze(0)?, t2)?.squeeze(Some(0))),
        MatmulStrategy::Mm => client.mm(t1, t2),
        MatmulStrategy::FoldedMm => folded_mm(client, t1, t2),
        MatmulStrategy::BatchedMm => batched_mm(client, t1, t2),
    }
}

/// `[..., n, k] @ [k, p]` (or `@ [k]`) as one `[rows, k] @ [k, p]` product
fn folded_mm<R>(client: &R::Client, t1: &Tensor<R>, t2: &Tensor<R>) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: MatmulOps<R>,
{
    let sizes1 = t1.shape();
    let last = sizes1.len() - 1;
    let k = sizes1[last];
    let rows: usize = sizes1[..last].iter().product();

    let folded = t1.reshape(&[rows, k])?;
    let rhs = if t2.ndim() == 1 {
        t2.unsqueeze(-1)?
    } else {
        t2.clone()
    };
    let out = client.mm(&folded, &rhs)?;

    let mut output_shape = sizes1[..last].to_vec();
    if t2.ndim() == 2 {
        output_shape.push(t2.shape()[1]);
    }
    out.reshape(&output_shape)
}

/// Broadcast the batch dimensions of both operands and use a single `bmm`
fn batched_mm<R>(client: &R::Client, t1: &Tensor<R>, t2: &Tensor<R>) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: MatmulOps<R>,
{
    let rank1 = t1.ndim();
    let rank2 = t2.ndim();

    // Promote vectors to matrices; the extra dim is dropped from the output.
    let mat1 = if rank1 == 1 { t1.unsqueeze(0)? } else { t1.clone() };
    let mat2 = if rank2 == 1 { t2.unsqueeze(-1)? } else { t2.clone() };

    let s1 = mat1.shape();
    let s2 = mat2.shape();
    let (n, m1) = (s1[s1.len() - 2], s1[s1.len() - 1]);
    let (m2, p) = (s2[s2.len() - 2], s2[s2.len() - 1]);

    let batch = infer_broadcast_shape(&s1[..s1.len() - 2], &s2[..s2.len() - 2])?;
    let batch_numel: usize = batch.iter().product();

    let mut expand1 = batch.to_vec();
    expand1.extend_from_slice(&[n, m1]);
    let mut expand2 = batch.to_vec();
    expand2.extend_from_slice(&[m2, p]);

    let lhs = mat1.broadcast_to(&expand1)?.reshape(&[batch_numel, n, m1])?;
    let rhs = mat2.broadcast_to(&expand2)?.reshape(&[batch_numel, m2, p])?;
    let out = client.bmm(&lhs, &rhs)?;

    let mut output_shape = batch.to_vec();
    if rank1 > 1 {
        output_shape.push(n);
    }
    if rank2 > 1 {
        output_shape.push(p);
    }
    out.reshape(&output_shape)
}
