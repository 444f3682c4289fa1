//! Unary operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Element-wise unary operations
pub trait UnaryOps<R: Runtime> {
    /// Negation: -a
    fn neg(&self, a: &Tensor<R>) -> Result<Tensor<R>>;

    /// Natural logarithm
    fn log(&self, a: &Tensor<R>) -> Result<Tensor<R>>;

    /// Exponential
    fn exp(&self, a: &Tensor<R>) -> Result<Tensor<R>>;

    /// Reciprocal: 1 / a (1 / inf is 0, 1 / 0 is inf)
    fn reciprocal(&self, a: &Tensor<R>) -> Result<Tensor<R>>;

    /// Square: a * a
    fn square(&self, a: &Tensor<R>) -> Result<Tensor<R>>;
}
