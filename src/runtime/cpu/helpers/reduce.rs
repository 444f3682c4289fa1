//! Reduction helpers for CPU tensors

use super::super::{CpuClient, CpuRuntime};
use super::{contiguous_strides, require_float};
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Sum over `dims` (all dims when empty), optionally keeping them as size 1
pub(crate) fn sum_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    dims: &[usize],
    keepdim: bool,
) -> Result<Tensor<CpuRuntime>> {
    require_float(a.dtype(), "sum")?;
    let shape = a.shape();
    let ndim = shape.len();

    let mut reduce = vec![dims.is_empty(); ndim];
    for &d in dims {
        if d >= ndim {
            return Err(Error::InvalidDimension {
                dim: d as isize,
                ndim,
            });
        }
        reduce[d] = true;
    }

    let kept_shape: Vec<usize> = shape
        .iter()
        .zip(&reduce)
        .map(|(&s, &r)| if r { 1 } else { s })
        .collect();
    let out_strides = contiguous_strides(&kept_shape);
    let out_len: usize = kept_shape.iter().product();

    let mut out = vec![0.0f64; out_len];
    for (linear, v) in a.values().into_iter().enumerate() {
        let mut rem = linear;
        let mut out_idx = 0;
        for d in (0..ndim).rev() {
            let coord = rem % shape[d];
            rem /= shape[d];
            if !reduce[d] {
                out_idx += coord * out_strides[d];
            }
        }
        out[out_idx] += v;
    }

    let out_shape: Vec<usize> = if keepdim {
        kept_shape
    } else {
        shape
            .iter()
            .zip(&reduce)
            .filter(|&(_, &r)| !r)
            .map(|(&s, _)| s)
            .collect()
    };
    Tensor::from_values(out, &out_shape, a.dtype(), &client.device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::runtime::cpu::CpuDevice;

    #[test]
    fn test_sum_dims() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &device);

        let s = sum_impl(&client, &a, &[0], false).unwrap();
        assert_eq!(s.shape(), &[3]);
        assert_eq!(s.to_vec::<f64>(), vec![5.0, 7.0, 9.0]);

        let s = sum_impl(&client, &a, &[1], true).unwrap();
        assert_eq!(s.shape(), &[2, 1]);
        assert_eq!(s.to_vec::<f64>(), vec![6.0, 15.0]);

        let s = sum_impl(&client, &a, &[], false).unwrap();
        assert!(s.is_scalar());
        assert_eq!(s.item::<f64>().unwrap(), 21.0);
    }

    #[test]
    fn test_sum_of_transposed_view() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &device);
        let s = sum_impl(&client, &a.t().unwrap(), &[1], false).unwrap();
        assert_eq!(s.to_vec::<f64>(), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_sum_rejects_bad_dim() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        let a = Tensor::<CpuRuntime>::zeros(&[2, 3], DType::F32, &device);
        assert!(sum_impl(&client, &a, &[2], false).is_err());
    }
}
