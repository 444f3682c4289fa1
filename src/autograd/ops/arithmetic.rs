//! Backward implementations for element-wise power and atan2
//!
//! Inputs may have been broadcast in the forward pass, so every gradient is
//! summed back to its input's shape.

use crate::autograd::{GradFn, single_grad};
use crate::dims::reduce_to_shape;
use crate::error::Result;
use crate::ops::{BinaryOps, CompareOps, ConditionalOps, ScalarOps, TensorOps, UnaryOps};
use crate::runtime::Runtime;
use crate::tensor::Tensor;
use tracing::trace_span;

/// Gradient of `input.pow(exponent)` with a plain-number exponent.
///
/// `grad * exponent * input^(exponent - 1)`, or zeros shaped like `input`
/// when `exponent == 0` (the forward result is constant).
pub fn pow_backward<R>(
    client: &R::Client,
    grad: &Tensor<R>,
    input: &Tensor<R>,
    exponent: f64,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("pow_backward", exponent).entered();
    if exponent == 0.0 {
        return Ok(input.zeros_like());
    }
    let powered = client.pow_scalar(input, exponent - 1.0)?;
    let scaled = client.mul_scalar(&powered, exponent)?;
    client.mul(grad, &scaled)
}

/// Gradient of `input.pow(exponent)` with respect to `input`, for a tensor
/// exponent.
///
/// Positions where the exponent is zero get a zero gradient, even where
/// `input^(-1)` is infinite.
pub fn pow_backward_self<R>(
    client: &R::Client,
    grad: &Tensor<R>,
    input: &Tensor<R>,
    exponent: &Tensor<R>,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("pow_backward_self").entered();
    let exponent_minus_one = client.add_scalar(exponent, -1.0)?;
    let powered = client.pow(input, &exponent_minus_one)?;
    let value = client.mul(grad, &client.mul(exponent, &powered)?)?;

    let is_zero = client.eq_scalar(exponent, 0.0)?;
    let zero = Tensor::zeros(&[], value.dtype(), value.device());
    let masked = client.where_cond(&is_zero, &zero, &value)?;
    reduce_to_shape(client, &masked, input.shape())
}

/// Gradient of `input.pow(exponent)` with respect to a tensor exponent:
/// `grad * input^exponent * ln(input)`.
pub fn pow_backward_exponent<R>(
    client: &R::Client,
    grad: &Tensor<R>,
    input: &Tensor<R>,
    exponent: &Tensor<R>,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("pow_backward_exponent").entered();
    let result = client.pow(input, exponent)?;
    let value = client.mul(grad, &client.mul(&result, &client.log(input)?)?)?;
    reduce_to_shape(client, &value, exponent.shape())
}

/// Gradient of `base.pow(exponent)` with respect to the exponent, for a
/// plain-number base: `grad * base^exponent * ln(base)`.
pub fn pow_backward_exponent_scalar_base<R>(
    client: &R::Client,
    grad: &Tensor<R>,
    base: f64,
    exponent: &Tensor<R>,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("pow_backward_exponent_scalar_base", base).entered();
    let base_tensor = Tensor::full_scalar(&[], exponent.dtype(), base, exponent.device());
    let result = client.pow(&base_tensor, exponent)?;
    let value = client.mul(grad, &client.mul_scalar(&result, base.ln())?)?;
    reduce_to_shape(client, &value, exponent.shape())
}

/// Gradient of `atan2(input, other)`.
///
/// With `r = 1 / (input² + other²)`:
/// - input slot: `grad * other * r` (computed iff `mask[0]`)
/// - other slot: `grad * -input * r` (computed iff `mask[1]`)
///
/// Each result is summed back to its input's shape. With both mask entries
/// false nothing is computed.
pub fn atan2_backward<R>(
    client: &R::Client,
    grad: &Tensor<R>,
    input: &Tensor<R>,
    other: &Tensor<R>,
    mask: [bool; 2],
) -> Result<[Option<Tensor<R>>; 2]>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("atan2_backward", ?mask).entered();
    if !mask[0] && !mask[1] {
        return Ok([None, None]);
    }

    let denom = client.add(&client.square(input)?, &client.square(other)?)?;
    let recip = client.reciprocal(&denom)?;

    let grad_input = if mask[0] {
        let value = client.mul(grad, &client.mul(other, &recip)?)?;
        Some(reduce_to_shape(client, &value, input.shape())?)
    } else {
        None
    };
    let grad_other = if mask[1] {
        let neg_input = client.neg(input)?;
        let value = client.mul(grad, &client.mul(&neg_input, &recip)?)?;
        Some(reduce_to_shape(client, &value, other.shape())?)
    } else {
        None
    };

    Ok([grad_input, grad_other])
}

// ============================================================================
// PowBackward
// ============================================================================

/// Backward for `z = a^e` with a plain-number exponent
pub struct PowBackward<R: Runtime> {
    saved_tensors: Vec<Tensor<R>>, // [a]
    exponent: f64,
}

impl<R: Runtime> PowBackward<R> {
    /// Create a new PowBackward
    pub fn new(input: Tensor<R>, exponent: f64) -> Self {
        Self {
            saved_tensors: vec![input],
            exponent,
        }
    }
}

impl<R: Runtime> GradFn<R> for PowBackward<R>
where
    R::Client: TensorOps<R>,
{
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        let Some(grad) = single_grad(grad_outputs) else {
            return Ok(vec![None]);
        };
        let client = R::default_client(grad.device());
        let grad_input = pow_backward(&client, grad, &self.saved_tensors[0], self.exponent)?;
        Ok(vec![Some(grad_input)])
    }

    fn saved_tensors(&self) -> &[Tensor<R>] {
        &self.saved_tensors
    }

    fn name(&self) -> &'static str {
        "PowBackward"
    }
}

// ============================================================================
// PowTensorBackward
// ============================================================================

/// Backward for `z = a^b` with a tensor exponent
///
/// Gradients:
/// - dL/da = dL/dz * b * a^(b-1)   (zero where b == 0)
/// - dL/db = dL/dz * a^b * ln(a)
pub struct PowTensorBackward<R: Runtime> {
    saved_tensors: Vec<Tensor<R>>, // [a, b]
    mask: [bool; 2],
}

impl<R: Runtime> PowTensorBackward<R> {
    /// Create a new PowTensorBackward
    pub fn new(input: Tensor<R>, exponent: Tensor<R>, mask: [bool; 2]) -> Self {
        Self {
            saved_tensors: vec![input, exponent],
            mask,
        }
    }
}

impl<R: Runtime> GradFn<R> for PowTensorBackward<R>
where
    R::Client: TensorOps<R>,
{
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        let Some(grad) = single_grad(grad_outputs) else {
            return Ok(vec![None, None]);
        };
        let client = R::default_client(grad.device());
        let input = &self.saved_tensors[0];
        let exponent = &self.saved_tensors[1];

        let grad_input = if self.mask[0] {
            Some(pow_backward_self(&client, grad, input, exponent)?)
        } else {
            None
        };
        let grad_exponent = if self.mask[1] {
            Some(pow_backward_exponent(&client, grad, input, exponent)?)
        } else {
            None
        };
        Ok(vec![grad_input, grad_exponent])
    }

    fn saved_tensors(&self) -> &[Tensor<R>] {
        &self.saved_tensors
    }

    fn name(&self) -> &'static str {
        "PowTensorBackward"
    }
}

// ============================================================================
// Atan2Backward
// ============================================================================

/// Backward for `z = atan2(a, b)`
pub struct Atan2Backward<R: Runtime> {
    saved_tensors: Vec<Tensor<R>>, // [a, b]
    mask: [bool; 2],
}

impl<R: Runtime> Atan2Backward<R> {
    /// Create a new Atan2Backward
    pub fn new(input: Tensor<R>, other: Tensor<R>, mask: [bool; 2]) -> Self {
        Self {
            saved_tensors: vec![input, other],
            mask,
        }
    }
}

impl<R: Runtime> GradFn<R> for Atan2Backward<R>
where
    R::Client: TensorOps<R>,
{
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        let Some(grad) = single_grad(grad_outputs) else {
            return Ok(vec![None, None]);
        };
        let client = R::default_client(grad.device());
        let grads = atan2_backward(
            &client,
            grad,
            &self.saved_tensors[0],
            &self.saved_tensors[1],
            self.mask,
        )?;
        Ok(grads.into())
    }

    fn saved_tensors(&self) -> &[Tensor<R>] {
        &self.saved_tensors
    }

    fn name(&self) -> &'static str {
        "Atan2Backward"
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-10, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_pow_backward_square() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let x = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0], &[3], &device);
        let grad = Tensor::<CpuRuntime>::ones(&[3], DType::F64, &device);
        let g = pow_backward(&client, &grad, &x, 2.0).unwrap();
        assert_eq!(g.to_vec::<f64>(), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_pow_backward_zero_exponent() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        // 0^-1 would be infinite; the zero exponent short-circuits
        let x = Tensor::<CpuRuntime>::from_slice(&[0.0f32, 2.0, -3.0], &[3], &device);
        let grad = Tensor::<CpuRuntime>::ones(&[3], DType::F32, &device);
        let g = pow_backward(&client, &grad, &x, 0.0).unwrap();
        assert_eq!(g.shape(), &[3]);
        assert_eq!(g.dtype(), DType::F32);
        assert_eq!(g.to_vec::<f32>(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_pow_backward_self_masks_zero_exponent() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let x = Tensor::<CpuRuntime>::from_slice(&[0.0f64, 2.0], &[2], &device);
        let e = Tensor::<CpuRuntime>::from_slice(&[0.0f64, 3.0], &[2], &device);
        let grad = Tensor::<CpuRuntime>::ones(&[2], DType::F64, &device);
        let g = pow_backward_self(&client, &grad, &x, &e).unwrap();
        assert_eq!(g.to_vec::<f64>(), vec![0.0, 12.0]);
    }

    #[test]
    fn test_pow_backward_self_broadcast_input() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let x = Tensor::<CpuRuntime>::from_slice(&[2.0f64], &[1], &device);
        let e = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0], &[3], &device);
        let grad = Tensor::<CpuRuntime>::ones(&[3], DType::F64, &device);
        let g = pow_backward_self(&client, &grad, &x, &e).unwrap();
        // 1 + 2*2 + 3*4
        assert_eq!(g.shape(), &[1]);
        assert_eq!(g.to_vec::<f64>(), vec![17.0]);
    }

    #[test]
    fn test_pow_backward_exponent() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let x = Tensor::<CpuRuntime>::from_slice(&[2.0f64, 3.0], &[2], &device);
        let e = Tensor::<CpuRuntime>::from_slice(&[2.0f64], &[], &device);
        let grad = Tensor::<CpuRuntime>::ones(&[2], DType::F64, &device);
        let g = pow_backward_exponent(&client, &grad, &x, &e).unwrap();
        assert!(g.is_scalar());
        let expected = 4.0 * 2.0f64.ln() + 9.0 * 3.0f64.ln();
        assert_close(&g.to_vec::<f64>(), &[expected]);

        let g = pow_backward_exponent_scalar_base(&client, &grad, 2.0, &x).unwrap();
        assert_close(
            &g.to_vec::<f64>(),
            &[4.0 * 2.0f64.ln(), 8.0 * 2.0f64.ln()],
        );
    }

    #[test]
    fn test_atan2_backward() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let y = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 3.0], &[2], &device);
        let x = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 4.0], &[2], &device);
        let grad = Tensor::<CpuRuntime>::ones(&[2], DType::F64, &device);

        let [gy, gx] = atan2_backward(&client, &grad, &y, &x, [true, true]).unwrap();
        assert_close(&gy.unwrap().to_vec::<f64>(), &[0.5, 4.0 / 25.0]);
        assert_close(&gx.unwrap().to_vec::<f64>(), &[-0.5, -3.0 / 25.0]);
    }

    #[test]
    fn test_atan2_backward_mask() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let y = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 3.0], &[2], &device);
        let x = Tensor::<CpuRuntime>::from_slice(&[1.0f64], &[1], &device);
        let grad = Tensor::<CpuRuntime>::ones(&[2], DType::F64, &device);

        let [gy, gx] = atan2_backward(&client, &grad, &y, &x, [true, false]).unwrap();
        assert_eq!(gy.unwrap().shape(), &[2]);
        assert!(gx.is_none());

        let [gy, gx] = atan2_backward(&client, &grad, &y, &x, [false, true]).unwrap();
        assert!(gy.is_none());
        // Broadcast input: summed back to [1]
        assert_close(&gx.unwrap().to_vec::<f64>(), &[-0.5 - 0.3]);

        let [gy, gx] = atan2_backward(&client, &grad, &y, &x, [false, false]).unwrap();
        assert!(gy.is_none() && gx.is_none());
    }

    #[test]
    fn test_nodes() {
        let device = CpuDevice::new();
        let x = Tensor::<CpuRuntime>::from_slice(&[3.0f64], &[1], &device);
        let grad = Tensor::<CpuRuntime>::ones(&[1], DType::F64, &device);

        let node = PowBackward::new(x.clone(), 3.0);
        let grads = node.backward(&[Some(grad.clone())]).unwrap();
        assert_eq!(grads[0].as_ref().unwrap().to_vec::<f64>(), vec![27.0]);
        assert!(node.backward(&[None]).unwrap()[0].is_none());

        let node = Atan2Backward::new(x.clone(), x.clone(), [false, true]);
        let grads = node.backward(&[Some(grad)]).unwrap();
        assert_eq!(node.name(), "Atan2Backward");
        assert!(grads[0].is_none());
        assert_close(&grads[1].as_ref().unwrap().to_vec::<f64>(), &[-1.0 / 6.0]);
    }
}
