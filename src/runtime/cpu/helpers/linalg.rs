//! Structured-matrix helpers for CPU tensors

use super::super::{CpuClient, CpuRuntime};
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Which triangle `triangle_impl` keeps
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TriangleKind {
    Upper,
    Lower,
}

fn matrix_dims(a: &Tensor<CpuRuntime>, op: &'static str) -> Result<(usize, usize)> {
    let ndim = a.ndim();
    if ndim < 2 {
        return Err(Error::invalid_argument(
            "input",
            format!("{op} expects a tensor with at least 2 dimensions, got {ndim}"),
        ));
    }
    Ok((a.shape()[ndim - 2], a.shape()[ndim - 1]))
}

/// Zero everything outside the selected triangle of the last two dims
pub(crate) fn triangle_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    kind: TriangleKind,
    diagonal: i64,
) -> Result<Tensor<CpuRuntime>> {
    let op = match kind {
        TriangleKind::Upper => "triu",
        TriangleKind::Lower => "tril",
    };
    let (rows, cols) = matrix_dims(a, op)?;
    let out = a
        .values()
        .into_iter()
        .enumerate()
        .map(|(lin, v)| {
            let i = ((lin / cols) % rows) as i64;
            let j = (lin % cols) as i64;
            let keep = match kind {
                TriangleKind::Upper => j - i >= diagonal,
                TriangleKind::Lower => j - i <= diagonal,
            };
            if keep { v } else { 0.0 }
        })
        .collect();
    Tensor::from_values(out, a.shape(), a.dtype(), &client.device)
}

/// Copy with the main diagonal of the last two dims set to `value`
pub(crate) fn fill_diagonal_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    value: f64,
) -> Result<Tensor<CpuRuntime>> {
    let (rows, cols) = matrix_dims(a, "fill_diagonal")?;
    let out = a
        .values()
        .into_iter()
        .enumerate()
        .map(|(lin, v)| {
            if (lin / cols) % rows == lin % cols {
                value
            } else {
                v
            }
        })
        .collect();
    Tensor::from_values(out, a.shape(), a.dtype(), &client.device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::runtime::cpu::CpuDevice;

    #[test]
    fn test_triangles() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        let a = Tensor::<CpuRuntime>::ones(&[3, 3], DType::F64, &device);
        let u = triangle_impl(&client, &a, TriangleKind::Upper, 1).unwrap();
        assert_eq!(
            u.to_vec::<f64>(),
            vec![0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]
        );
        let l = triangle_impl(&client, &a, TriangleKind::Lower, 0).unwrap();
        assert_eq!(
            l.to_vec::<f64>(),
            vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_fill_diagonal_batched() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        let a = Tensor::<CpuRuntime>::zeros(&[2, 2, 2], DType::F64, &device);
        let f = fill_diagonal_impl(&client, &a, f64::INFINITY).unwrap();
        let v = f.to_vec::<f64>();
        assert!(v[0].is_infinite() && v[3].is_infinite() && v[4].is_infinite() && v[7].is_infinite());
        assert_eq!((v[1], v[2], v[5], v[6]), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_requires_matrix() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        let a = Tensor::<CpuRuntime>::zeros(&[3], DType::F64, &device);
        assert!(triangle_impl(&client, &a, TriangleKind::Upper, 0).is_err());
    }
}
