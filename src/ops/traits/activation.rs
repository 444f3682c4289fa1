//! Activation operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Normalising activations
pub trait ActivationOps<R: Runtime> {
    /// Softmax along a dimension
    ///
    /// With `half_to_float`, a F16/BF16 input is read at its own width and
    /// the kernel writes an F32 result, avoiding a separate upcast copy.
    /// Backends that cannot do this return `Error::BackendLimitation`.
    fn softmax(&self, a: &Tensor<R>, dim: isize, half_to_float: bool) -> Result<Tensor<R>>;

    /// Log-softmax along a dimension; `half_to_float` as for [`Self::softmax`]
    fn log_softmax(&self, a: &Tensor<R>, dim: isize, half_to_float: bool) -> Result<Tensor<R>>;
}
