//! Reduction operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Reduction operations
pub trait ReduceOps<R: Runtime> {
    /// Sum along specified dimensions
    ///
    /// An empty `dims` list reduces over every dimension. With `keepdim`
    /// the reduced dimensions stay as size 1.
    fn sum(&self, a: &Tensor<R>, dims: &[usize], keepdim: bool) -> Result<Tensor<R>>;
}
