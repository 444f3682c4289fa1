//! Comparison operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Element-wise comparisons producing `Bool` tensors
pub trait CompareOps<R: Runtime> {
    /// a == scalar
    fn eq_scalar(&self, a: &Tensor<R>, scalar: f64) -> Result<Tensor<R>>;
}
