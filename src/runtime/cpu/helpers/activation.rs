//! Activation helpers for CPU tensors

use super::super::{CpuClient, CpuRuntime};
use super::{contiguous_strides, require_float};
use crate::dims::wrap_dim;
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Which normalisation `softmax_impl` computes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SoftmaxKind {
    Softmax,
    LogSoftmax,
}

impl SoftmaxKind {
    fn name(self) -> &'static str {
        match self {
            SoftmaxKind::Softmax => "softmax",
            SoftmaxKind::LogSoftmax => "log_softmax",
        }
    }
}

/// Numerically stable (log-)softmax along `dim`
pub(crate) fn softmax_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    dim: isize,
    half_to_float: bool,
    kind: SoftmaxKind,
) -> Result<Tensor<CpuRuntime>> {
    if half_to_float {
        return Err(Error::backend_limitation(
            "cpu",
            kind.name(),
            "half_to_float is only implemented by accelerator backends",
        ));
    }
    require_float(a.dtype(), kind.name())?;

    // A scalar behaves like a single-element vector
    let shape: Vec<usize> = if a.ndim() == 0 {
        vec![1]
    } else {
        a.shape().to_vec()
    };
    let d = wrap_dim(dim, shape.len())?;
    let size = shape[d];
    let inner = contiguous_strides(&shape)[d];
    let values = a.values();
    let mut out = vec![0.0; values.len()];

    if size > 0 && inner > 0 {
        let outer = values.len() / (size * inner);
        for o in 0..outer {
            for i in 0..inner {
                let base = o * size * inner + i;
                let lane = (0..size).map(|k| base + k * inner);
                let max = lane
                    .clone()
                    .map(|idx| values[idx])
                    .fold(f64::NEG_INFINITY, f64::max);
                let sum: f64 = lane.clone().map(|idx| (values[idx] - max).exp()).sum();
                for idx in lane {
                    out[idx] = match kind {
                        SoftmaxKind::Softmax => (values[idx] - max).exp() / sum,
                        SoftmaxKind::LogSoftmax => values[idx] - max - sum.ln(),
                    };
                }
            }
        }
    }
    Tensor::from_values(out, a.shape(), a.dtype(), &client.device)
}
