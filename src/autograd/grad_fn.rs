//! Gradient function trait

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Trait for computing gradients during backward pass
///
/// Each operation that participates in autograd has an associated
/// `GradFn` that captures what it needs from the forward pass and knows how
/// to compute gradients for its inputs. Nodes carry no graph edges; the
/// caller decides when to invoke them and where the results go.
pub trait GradFn<R: Runtime>: Send + Sync {
    /// Compute gradients for the inputs given the gradients of the outputs
    ///
    /// `grad_outputs` has one slot per forward output; `None` is an
    /// undefined (implicitly zero) gradient. Returns one optional gradient
    /// per input. `None` means no gradient flows to that input.
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>>;

    /// Get tensors saved during forward pass
    fn saved_tensors(&self) -> &[Tensor<R>] {
        &[]
    }

    /// Human-readable name for debugging
    fn name(&self) -> &'static str;
}

/// Upstream gradient of a single-output node, if defined
#[inline]
pub(crate) fn single_grad<R: Runtime>(grad_outputs: &[Option<Tensor<R>>]) -> Option<&Tensor<R>> {
    grad_outputs.first().and_then(Option::as_ref)
}
