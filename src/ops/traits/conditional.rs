//! Conditional operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Conditional operations
pub trait ConditionalOps<R: Runtime> {
    /// Conditional select: where(cond, x, y) = cond ? x : y
    ///
    /// `cond` may have any dtype (non-zero is true). The three operands
    /// broadcast together; `x` and `y` must share a dtype, which the output
    /// takes.
    fn where_cond(&self, cond: &Tensor<R>, x: &Tensor<R>, y: &Tensor<R>) -> Result<Tensor<R>>;
}
