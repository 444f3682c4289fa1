//! Type conversion operations trait.

use crate::dtype::DType;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Type conversion operations
pub trait TypeConversionOps<R: Runtime> {
    /// Cast tensor to a different data type.
    ///
    /// Returns the same tensor handle (no copy) when `a` already has `dtype`.
    fn cast(&self, a: &Tensor<R>, dtype: DType) -> Result<Tensor<R>>;
}
