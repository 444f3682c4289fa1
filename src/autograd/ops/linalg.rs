//! Backward implementations for linear algebra operations

use crate::autograd::GradFn;
use crate::error::{Error, Result};
use crate::ops::{BinaryOps, LinalgOps, TensorOps, UnaryOps, matmul};
use crate::runtime::Runtime;
use crate::tensor::Tensor;
use tracing::trace_span;

/// Gradient of the symmetric eigendecomposition `(λ, V) = symeig(self)`.
///
/// `grads` holds `[dL/dλ, dL/dV]`; either may be undefined. Operates on the
/// last two dimensions, so leading batch dimensions are carried through.
///
/// ```text
/// F[i, j] = 1 / (λ_j - λ_i)   (0 on the diagonal)
/// r       = V (F ∘ (Vᵀ gV)) Vᵀ + V diag(gλ) Vᵀ
/// ```
///
/// Only one triangle of `self` is read by the forward pass, so the result is
/// folded into that triangle: `triu(r) + triu(rᵀ, 1)` when `upper`, else
/// `tril(r) + tril(rᵀ, -1)`.
///
/// # Errors
///
/// [`Error::UnsupportedConfiguration`] when the forward pass did not compute
/// eigenvectors.
pub fn symeig_backward<R>(
    client: &R::Client,
    grads: &[Option<Tensor<R>>],
    input: &Tensor<R>,
    eigenvectors: bool,
    upper: bool,
    lambda: &Tensor<R>,
    v: &Tensor<R>,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("symeig_backward", eigenvectors, upper).entered();
    if !eigenvectors {
        return Err(Error::UnsupportedConfiguration {
            op: "symeig_backward",
            reason: "symeig_backward is not implemented when eigenvectors=false; \
                     compute eigenvectors in the forward pass to differentiate it"
                .to_string(),
        });
    }
    let [grad_lambda, grad_v] = grads else {
        return Err(Error::invalid_argument(
            "grads",
            format!("expected 2 gradients (eigenvalues, eigenvectors), got {}", grads.len()),
        ));
    };

    let vt = v.transpose(-2, -1)?;

    let mut result = match grad_v {
        Some(gv) => {
            let gaps = client.sub(&lambda.unsqueeze(-2)?, &lambda.unsqueeze(-1)?)?;
            let f = client.reciprocal(&client.fill_diagonal(&gaps, f64::INFINITY)?)?;
            let weighted = client.mul(&f, &matmul(client, &vt, gv)?)?;
            matmul(client, &matmul(client, v, &weighted)?, &vt)?
        }
        None => input.zeros_like(),
    };

    if let Some(gl) = grad_lambda {
        let scaled = client.mul(v, &gl.unsqueeze(-2)?)?;
        result = client.add(&result, &matmul(client, &scaled, &vt)?)?;
    }

    let rt = result.transpose(-2, -1)?;
    if upper {
        client.add(&client.triu(&result, 0)?, &client.triu(&rt, 1)?)
    } else {
        client.add(&client.tril(&result, 0)?, &client.tril(&rt, -1)?)
    }
}

// ============================================================================
// SymeigBackward
// ============================================================================

/// Backward for `(λ, V) = symeig(a, eigenvectors, upper)`
///
/// Takes two upstream gradients `[dL/dλ, dL/dV]` and produces one.
pub struct SymeigBackward<R: Runtime> {
    saved: [Tensor<R>; 3],
    eigenvectors: bool,
    upper: bool,
}

impl<R: Runtime> SymeigBackward<R> {
    /// Create a new SymeigBackward from the input and both forward outputs
    pub fn new(
        input: Tensor<R>,
        eigenvectors: bool,
        upper: bool,
        lambda: Tensor<R>,
        v: Tensor<R>,
    ) -> Self {
        Self {
            saved: [input, lambda, v],
            eigenvectors,
            upper,
        }
    }
}

impl<R: Runtime> GradFn<R> for SymeigBackward<R>
where
    R::Client: TensorOps<R>,
{
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        if grad_outputs.iter().all(Option::is_none) {
            return Ok(vec![None]);
        }
        let [input, lambda, v] = &self.saved;
        let client = R::default_client(input.device());
        let grad_input = symeig_backward(
            &client,
            grad_outputs,
            input,
            self.eigenvectors,
            self.upper,
            lambda,
            v,
        )?;
        Ok(vec![Some(grad_input)])
    }

    fn saved_tensors(&self) -> &[Tensor<R>] {
        &self.saved
    }

    fn name(&self) -> &'static str {
        "SymeigBackward"
    }
}
