//! Shape and indexing helpers for CPU tensors

use super::super::{CpuClient, CpuRuntime};
use super::{contiguous_strides, validate_binary_dtypes};
use crate::dims::wrap_dim;
use crate::error::{Error, Result};
use crate::runtime::shape_ops::validate_cat;
use crate::tensor::{Layout, Tensor, normalize_slice};

/// Concatenate along `dim`; legacy `[0]` inputs are skipped
pub(crate) fn cat_impl(
    client: &CpuClient,
    tensors: &[&Tensor<CpuRuntime>],
    dim: isize,
) -> Result<Tensor<CpuRuntime>> {
    let params = validate_cat(tensors, dim)?;
    let out_len: usize = params.out_shape.iter().product();
    if out_len == 0 {
        return Ok(Tensor::zeros(&params.out_shape, params.dtype, &client.device));
    }

    // Each input contributes one contiguous block per outer index
    let blocks: Vec<(Vec<f64>, usize)> = params
        .inputs
        .iter()
        .map(|&i| {
            let t = tensors[i];
            (t.values(), t.shape()[params.dim_idx] * params.inner_size)
        })
        .collect();

    let mut out = Vec::with_capacity(out_len);
    for o in 0..params.outer_size {
        for (values, block) in &blocks {
            out.extend_from_slice(&values[o * block..(o + 1) * block]);
        }
    }
    Tensor::from_values(out, &params.out_shape, params.dtype, &client.device)
}

/// Roll along each `(shift, dim)` pair; no dims rolls the flattened tensor
pub(crate) fn roll_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    shifts: &[i64],
    dims: &[isize],
) -> Result<Tensor<CpuRuntime>> {
    if dims.is_empty() {
        if shifts.len() != 1 {
            return Err(Error::invalid_argument(
                "shifts",
                format!("rolling a flattened tensor takes one shift, got {}", shifts.len()),
            ));
        }
        let flat = a.reshape(&[a.numel()])?;
        return roll_impl(client, &flat, shifts, &[0])?.reshape(a.shape());
    }
    if shifts.len() != dims.len() {
        return Err(Error::invalid_argument(
            "shifts",
            format!(
                "shifts and dims must align, got {} shifts and {} dims",
                shifts.len(),
                dims.len()
            ),
        ));
    }

    let shape = a.shape();
    let strides = contiguous_strides(shape);
    let mut values = a.values();
    for (&shift, &dim) in shifts.iter().zip(dims) {
        let d = wrap_dim(dim, shape.len())?;
        let size = shape[d];
        if size == 0 {
            continue;
        }
        let shift = shift.rem_euclid(size as i64) as usize;
        if shift == 0 {
            continue;
        }
        let stride = strides[d];
        let mut rolled = vec![0.0; values.len()];
        for (i, &v) in values.iter().enumerate() {
            let coord = (i / stride) % size;
            let target = (coord + shift) % size;
            let j = i - coord * stride + target * stride;
            rolled[j] = v;
        }
        values = rolled;
    }
    Tensor::from_values(values, shape, a.dtype(), &client.device)
}

/// Copy of `dst` with `dst.slice(dim, start, end, step)` replaced by `src`
pub(crate) fn slice_scatter_impl(
    client: &CpuClient,
    dst: &Tensor<CpuRuntime>,
    src: &Tensor<CpuRuntime>,
    dim: isize,
    start: isize,
    end: isize,
    step: isize,
) -> Result<Tensor<CpuRuntime>> {
    if step <= 0 {
        return Err(Error::invalid_argument(
            "step",
            format!("slice step must be positive, got {step}"),
        ));
    }
    let dtype = validate_binary_dtypes(dst, src)?;
    let d = wrap_dim(dim, dst.ndim())?;
    let step = step as usize;
    let (start, length) = normalize_slice(dst.shape()[d], start, end, step);

    let mut expected = dst.shape().to_vec();
    expected[d] = length;
    if src.shape() != expected.as_slice() {
        return Err(Error::shape_mismatch(&expected, src.shape()));
    }

    let positions = Layout::contiguous(dst.shape())
        .slice(d, start, length, step)
        .ok_or(Error::InvalidDimension {
            dim,
            ndim: dst.ndim(),
        })?
        .offsets();
    let mut out = dst.values();
    for (p, v) in positions.into_iter().zip(src.values()) {
        out[p] = v;
    }
    Tensor::from_values(out, dst.shape(), dtype, &client.device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::runtime::cpu::CpuDevice;

    fn client() -> (CpuDevice, CpuClient) {
        let device = CpuDevice::new();
        (device.clone(), CpuClient::new(device))
    }

    #[test]
    fn test_cat_inner_dim() {
        let (device, client) = client();
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);
        let b = Tensor::<CpuRuntime>::from_slice(&[5.0f64, 6.0], &[2, 1], &device);
        let c = cat_impl(&client, &[&a, &b], -1).unwrap();
        assert_eq!(c.shape(), &[2, 3]);
        assert_eq!(c.to_vec::<f64>(), vec![1.0, 2.0, 5.0, 3.0, 4.0, 6.0]);
    }

    #[test]
    fn test_cat_all_legacy_empty() {
        let (device, client) = client();
        let e = Tensor::<CpuRuntime>::zeros(&[0], DType::F32, &device);
        assert_eq!(cat_impl(&client, &[&e, &e], 3).unwrap().shape(), &[0]);
    }

    #[test]
    fn test_roll() {
        let (device, client) = client();
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &device);
        let r = roll_impl(&client, &a, &[1], &[1]).unwrap();
        assert_eq!(r.to_vec::<f64>(), vec![3.0, 1.0, 2.0, 6.0, 4.0, 5.0]);
        let r = roll_impl(&client, &a, &[-1, 1], &[1, 0]).unwrap();
        assert_eq!(r.to_vec::<f64>(), vec![5.0, 6.0, 4.0, 2.0, 3.0, 1.0]);
        let r = roll_impl(&client, &a, &[2], &[]).unwrap();
        assert_eq!(r.shape(), &[2, 3]);
        assert_eq!(r.to_vec::<f64>(), vec![5.0, 6.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_slice_scatter() {
        let (device, client) = client();
        let dst = Tensor::<CpuRuntime>::zeros(&[2, 5], DType::F64, &device);
        let src = Tensor::<CpuRuntime>::ones(&[2, 2], DType::F64, &device);
        let out = slice_scatter_impl(&client, &dst, &src, 1, 1, 5, 2).unwrap();
        assert_eq!(
            out.to_vec::<f64>(),
            vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0]
        );
        assert_eq!(dst.to_vec::<f64>(), vec![0.0; 10]);
    }

    #[test]
    fn test_slice_scatter_shape_check() {
        let (device, client) = client();
        let dst = Tensor::<CpuRuntime>::zeros(&[4], DType::F64, &device);
        let src = Tensor::<CpuRuntime>::ones(&[3], DType::F64, &device);
        assert!(matches!(
            slice_scatter_impl(&client, &dst, &src, 0, 0, 2, 1),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
