//! Softmax with an explicit result dtype
//!
//! `softmax(x, dim, dtype)` and `log_softmax(x, dim, dtype)` are
//! differentiated through their plain counterparts; what needs care is how
//! the requested dtype is honoured, which [`SoftmaxPlan`] decides.

use crate::dtype::DType;
use crate::error::Result;
use crate::ops::{ActivationOps, TensorOps, TypeConversionOps};
use crate::runtime::{Device, Runtime};
use crate::tensor::Tensor;
use tracing::trace;

/// How a softmax with a requested result dtype is executed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SoftmaxPlan {
    /// Half-precision input on an accelerator with an F32 result: the kernel
    /// reads the half values and writes F32 (`half_to_float`)
    UpcastInKernel,
    /// Cast the input to this dtype, then run the kernel without upcast
    CastFirst(DType),
    /// No dtype requested: run the kernel on the input as is
    Direct,
}

impl SoftmaxPlan {
    /// Pick the plan for an input dtype, device kind and requested dtype
    pub fn select(input: DType, on_accelerator: bool, requested: Option<DType>) -> Self {
        match requested {
            None => SoftmaxPlan::Direct,
            Some(DType::F32) if on_accelerator && input.is_half() => SoftmaxPlan::UpcastInKernel,
            Some(dtype) => SoftmaxPlan::CastFirst(dtype),
        }
    }
}

fn run_plan<R, F>(
    client: &R::Client,
    input: &Tensor<R>,
    dtype: Option<DType>,
    op: &'static str,
    kernel: F,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
    F: Fn(&Tensor<R>, bool) -> Result<Tensor<R>>,
{
    let plan = SoftmaxPlan::select(input.dtype(), input.device().is_accelerator(), dtype);
    trace!(op, ?plan, input_dtype = ?input.dtype(), shape = ?input.shape(), "softmax plan");

    match plan {
        SoftmaxPlan::UpcastInKernel => kernel(input, true),
        SoftmaxPlan::CastFirst(dtype) => kernel(&client.cast(input, dtype)?, false),
        SoftmaxPlan::Direct => kernel(input, false),
    }
}

/// Softmax along `dim`, producing `dtype` when given
pub fn softmax_with_dtype<R>(
    client: &R::Client,
    input: &Tensor<R>,
    dim: isize,
    dtype: Option<DType>,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    run_plan(client, input, dtype, "softmax", |x, half_to_float| {
        client.softmax(x, dim, half_to_float)
    })
}

/// Log-softmax along `dim`, producing `dtype` when given
pub fn log_softmax_with_dtype<R>(
    client: &R::Client,
    input: &Tensor<R>,
    dim: isize,
    dtype: Option<DType>,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    run_plan(client, input, dtype, "log_softmax", |x, half_to_float| {
        client.log_softmax(x, dim, half_to_float)
    })
}
