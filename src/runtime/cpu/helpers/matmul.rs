//! Matrix multiplication helpers for CPU tensors

use super::super::{CpuClient, CpuRuntime};
use super::{require_float, validate_binary_dtypes};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::tensor::Tensor;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// `out[m, n] = a[m, k] @ b[k, n]` on row-major buffers
fn mm_kernel(a: &[f64], b: &[f64], out: &mut [f64], m: usize, k: usize, n: usize) {
    for i in 0..m {
        let row = &mut out[i * n..(i + 1) * n];
        for kk in 0..k {
            let a_ik = a[i * k + kk];
            let b_row = &b[kk * n..(kk + 1) * n];
            for (o, &b_kj) in row.iter_mut().zip(b_row) {
                *o += a_ik * b_kj;
            }
        }
    }
}

fn check_rank(t: &Tensor<CpuRuntime>, rank: usize, op: &'static str) -> Result<()> {
    if t.ndim() != rank {
        return Err(Error::invalid_argument(
            "tensor",
            format!("{op} expects a {rank}-D tensor, got shape {:?}", t.shape()),
        ));
    }
    Ok(())
}

fn matmul_dtype(a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>, op: &'static str) -> Result<DType> {
    let dtype = validate_binary_dtypes(a, b)?;
    require_float(dtype, op)?;
    Ok(dtype)
}

/// `[k] . [k] -> []`
pub(crate) fn dot_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    b: &Tensor<CpuRuntime>,
) -> Result<Tensor<CpuRuntime>> {
    let dtype = matmul_dtype(a, b, "dot")?;
    check_rank(a, 1, "dot")?;
    check_rank(b, 1, "dot")?;
    if a.shape() != b.shape() {
        return Err(Error::shape_mismatch(a.shape(), b.shape()));
    }
    let sum: f64 = a.values().iter().zip(b.values()).map(|(x, y)| x * y).sum();
    Tensor::from_values(vec![sum], &[], dtype, &client.device)
}

/// `[m, k] @ [k] -> [m]`
pub(crate) fn mv_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    v: &Tensor<CpuRuntime>,
) -> Result<Tensor<CpuRuntime>> {
    let dtype = matmul_dtype(a, v, "mv")?;
    check_rank(a, 2, "mv")?;
    check_rank(v, 1, "mv")?;
    let (m, k) = (a.shape()[0], a.shape()[1]);
    if v.shape()[0] != k {
        return Err(Error::shape_mismatch(&[k], v.shape()));
    }
    let mut out = vec![0.0; m];
    mm_kernel(&a.values(), &v.values(), &mut out, m, k, 1);
    Tensor::from_values(out, &[m], dtype, &client.device)
}

/// `[m, k] @ [k, n] -> [m, n]`
pub(crate) fn mm_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    b: &Tensor<CpuRuntime>,
) -> Result<Tensor<CpuRuntime>> {
    let dtype = matmul_dtype(a, b, "mm")?;
    check_rank(a, 2, "mm")?;
    check_rank(b, 2, "mm")?;
    let (m, k) = (a.shape()[0], a.shape()[1]);
    let (k2, n) = (b.shape()[0], b.shape()[1]);
    if k != k2 {
        return Err(Error::shape_mismatch(&[k, n], b.shape()));
    }
    let mut out = vec![0.0; m * n];
    mm_kernel(&a.values(), &b.values(), &mut out, m, k, n);
    Tensor::from_values(out, &[m, n], dtype, &client.device)
}

/// `[b, m, k] @ [b, k, n] -> [b, m, n]`, parallel over the batch with `rayon`
pub(crate) fn bmm_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    b: &Tensor<CpuRuntime>,
) -> Result<Tensor<CpuRuntime>> {
    let dtype = matmul_dtype(a, b, "bmm")?;
    check_rank(a, 3, "bmm")?;
    check_rank(b, 3, "bmm")?;
    let (batch, m, k) = (a.shape()[0], a.shape()[1], a.shape()[2]);
    let (batch2, k2, n) = (b.shape()[0], b.shape()[1], b.shape()[2]);
    if batch != batch2 || k != k2 {
        return Err(Error::shape_mismatch(&[batch, k, n], b.shape()));
    }

    let a_vals = a.values();
    let b_vals = b.values();
    let mut out = vec![0.0; batch * m * n];
    let block = m * n;
    if block > 0 {
        #[cfg(feature = "rayon")]
        out.par_chunks_mut(block).enumerate().for_each(|(i, c)| {
            mm_kernel(
                &a_vals[i * m * k..(i + 1) * m * k],
                &b_vals[i * k * n..(i + 1) * k * n],
                c,
                m,
                k,
                n,
            )
        });
        #[cfg(not(feature = "rayon"))]
        out.chunks_mut(block).enumerate().for_each(|(i, c)| {
            mm_kernel(
                &a_vals[i * m * k..(i + 1) * m * k],
                &b_vals[i * k * n..(i + 1) * k * n],
                c,
                m,
                k,
                n,
            )
        });
    }
    Tensor::from_values(out, &[batch, m, n], dtype, &client.device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::CpuDevice;

    #[test]
    fn test_mm_values() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);
        let b = Tensor::<CpuRuntime>::from_slice(&[5.0f64, 6.0, 7.0, 8.0], &[2, 2], &device);
        let c = mm_impl(&client, &a, &b).unwrap();
        assert_eq!(c.to_vec::<f64>(), vec![19.0, 22.0, 43.0, 50.0]);
        // Transposed (column-major) operand
        let c = mm_impl(&client, &a.t().unwrap(), &b).unwrap();
        assert_eq!(c.to_vec::<f64>(), vec![26.0, 30.0, 38.0, 44.0]);
    }

    #[test]
    fn test_bmm_matches_mm_per_batch() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        let data: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let a = Tensor::<CpuRuntime>::from_slice(&data, &[2, 2, 3], &device);
        let b = Tensor::<CpuRuntime>::from_slice(&data, &[2, 3, 2], &device);
        let c = bmm_impl(&client, &a, &b).unwrap();
        assert_eq!(c.shape(), &[2, 2, 2]);
        let first = mm_impl(
            &client,
            &a.narrow(0, 0, 1).unwrap().squeeze(Some(0)),
            &b.narrow(0, 0, 1).unwrap().squeeze(Some(0)),
        )
        .unwrap();
        assert_eq!(c.to_vec::<f64>()[..4].to_vec(), first.to_vec::<f64>());
    }

    #[test]
    fn test_dot_and_mv() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        let v = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0], &[3], &device);
        assert_eq!(dot_impl(&client, &v, &v).unwrap().item::<f64>().unwrap(), 14.0);
        let m = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 0.0, 0.0, 0.0, 1.0, 1.0], &[2, 3], &device);
        assert_eq!(mv_impl(&client, &m, &v).unwrap().to_vec::<f64>(), vec![1.0, 5.0]);
    }

    #[test]
    fn test_mm_inner_mismatch() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        let a = Tensor::<CpuRuntime>::zeros(&[2, 3], DType::F32, &device);
        assert!(matches!(mm_impl(&client, &a, &a), Err(Error::ShapeMismatch { .. })));
    }
}
