//! Linear algebra operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Structured-matrix operations over the last two dimensions
pub trait LinalgOps<R: Runtime> {
    /// Upper triangle: keep `(i, j)` with `j - i >= diagonal`, zero the rest
    fn triu(&self, a: &Tensor<R>, diagonal: i64) -> Result<Tensor<R>>;

    /// Lower triangle: keep `(i, j)` with `j - i <= diagonal`, zero the rest
    fn tril(&self, a: &Tensor<R>, diagonal: i64) -> Result<Tensor<R>>;

    /// Copy of `a` with its main diagonal set to `value`
    fn fill_diagonal(&self, a: &Tensor<R>, value: f64) -> Result<Tensor<R>>;
}
