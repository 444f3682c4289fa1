//! Matrix multiplication primitives trait.
//!
//! These are the fixed-rank kernels. Arbitrary-rank `a @ b` is built on top
//! of them by [`crate::ops::matmul`].

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Fixed-rank matrix multiplication primitives
pub trait MatmulOps<R: Runtime> {
    /// Inner product of two vectors `[k] . [k] -> []`
    fn dot(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Matrix-vector product `[m, k] @ [k] -> [m]`
    fn mv(&self, a: &Tensor<R>, v: &Tensor<R>) -> Result<Tensor<R>>;

    /// Matrix product `[m, k] @ [k, n] -> [m, n]`
    fn mm(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Batched matrix product `[b, m, k] @ [b, k, n] -> [b, m, n]`
    fn bmm(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;
}
