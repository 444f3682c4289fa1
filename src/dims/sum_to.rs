//! Reduce a gradient back to a broadcast input's shape

use crate::error::Result;
use crate::ops::ReduceOps;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Sum `tensor` down to `target`, undoing a forward broadcast.
///
/// 1. An empty `target` sums everything to a scalar.
/// 2. Leading dimensions beyond `target.len()` are summed away one at a time.
/// 3. Every remaining dimension where `target` is 1 but `tensor` is not is
///    summed with `keepdim` (a size-0 dimension sums to a single zero, so the
///    result always has exactly the target shape).
///
/// `target` must be broadcast-compatible with `tensor.shape()`; this is not
/// checked. When no reduction is needed the input handle is returned as is.
pub fn reduce_to_shape<R>(client: &R::Client, tensor: &Tensor<R>, target: &[usize]) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: ReduceOps<R>,
{
    if target.is_empty() {
        if tensor.ndim() == 0 {
            return Ok(tensor.clone());
        }
        return client.sum(tensor, &[], false);
    }

    let mut reduced = tensor.clone();
    while reduced.ndim() > target.len() {
        reduced = client.sum(&reduced, &[0], false)?;
    }

    let keep: Vec<usize> = target
        .iter()
        .zip(reduced.shape())
        .enumerate()
        .filter(|&(_, (&want, &have))| want == 1 && have != 1)
        .map(|(dim, _)| dim)
        .collect();
    if !keep.is_empty() {
        reduced = client.sum(&reduced, &keep, true)?;
    }

    Ok(reduced)
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    fn setup() -> (CpuDevice, <CpuRuntime as Runtime>::Client) {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        (device, client)
    }

    #[test]
    fn test_leading_dims_then_unit_dims() {
        let (device, client) = setup();
        let t = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 1, 3], &device);
        let r = reduce_to_shape(&client, &t, &[1, 3]).unwrap();
        assert_eq!(r.shape(), &[1, 3]);
        assert_eq!(r.to_vec::<f64>(), vec![5.0, 7.0, 9.0]);

        let r = reduce_to_shape(&client, &t, &[1, 1]).unwrap();
        assert_eq!(r.shape(), &[1, 1]);
        assert_eq!(r.to_vec::<f64>(), vec![21.0]);
    }

    #[test]
    fn test_empty_target_sums_everything() {
        let (device, client) = setup();
        let t = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);
        let r = reduce_to_shape(&client, &t, &[]).unwrap();
        assert!(r.is_scalar());
        assert_eq!(r.item::<f64>().unwrap(), 10.0);
    }

    #[test]
    fn test_empty_dim_against_unit_target() {
        let (device, client) = setup();
        let t = Tensor::<CpuRuntime>::zeros(&[0, 3], crate::dtype::DType::F32, &device);
        let r = reduce_to_shape(&client, &t, &[1, 3]).unwrap();
        assert_eq!(r.shape(), &[1, 3]);
        assert_eq!(r.to_vec::<f64>(), vec![0.0; 3]);
    }

    #[test]
    fn test_no_reduction_returns_same_handle() {
        let (device, client) = setup();
        let t = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0], &[3], &device);
        let r = reduce_to_shape(&client, &t, &[3]).unwrap();
        assert!(r.storage().ptr_eq(t.storage()));
    }
}
