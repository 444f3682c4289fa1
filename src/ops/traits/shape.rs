//! Shape operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Copying shape operations
pub trait ShapeOps<R: Runtime> {
    /// Concatenate tensors along a dimension
    ///
    /// All tensors must share dtype and every dimension except `dim`.
    fn cat(&self, tensors: &[&Tensor<R>], dim: isize) -> Result<Tensor<R>>;

    /// Roll elements along dimensions
    ///
    /// `shifts` and `dims` pair up one-to-one. With no `dims` the tensor is
    /// rolled as if flattened (and `shifts` must have a single entry).
    fn roll(&self, a: &Tensor<R>, shifts: &[i64], dims: &[isize]) -> Result<Tensor<R>>;
}
