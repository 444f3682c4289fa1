//! Backward implementations for structural operations
//!
//! split / split_with_sizes / chunk, cat, slice and roll. These move
//! gradient values around without arithmetic.

use crate::autograd::{GradFn, single_grad};
use crate::dims::wrap_dim;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::{IndexingOps, ShapeOps, TensorOps};
use crate::runtime::Runtime;
use crate::runtime::shape_ops::is_legacy_empty;
use crate::tensor::Tensor;
use tracing::trace_span;

pub use crate::runtime::shape_ops::{ChunkSplit, chunk_forward_sizes};

// ============================================================================
// split / split_with_sizes
// ============================================================================

/// Gradient of `split(input, split_size, dim)`.
///
/// Every piece has `split_size` elements along `dim` except the last, which
/// holds the remainder. See [`split_with_sizes_backward`].
pub fn split_backward<R>(
    client: &R::Client,
    grads: &[Option<Tensor<R>>],
    split_size: usize,
    dim: isize,
    sizes: &[usize],
    dtype: DType,
    device: &R::Device,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("split_backward", split_size, dim).entered();
    let dim_idx = wrap_dim(dim, sizes.len())?;
    let dim_size = sizes[dim_idx];
    let num_splits = grads.len();

    let mut split_sizes = vec![split_size; num_splits];
    if let Some(last) = split_sizes.last_mut() {
        *last = dim_size
            .checked_sub(split_size * (num_splits - 1))
            .ok_or_else(|| {
                Error::invalid_argument(
                    "grads",
                    format!(
                        "{num_splits} pieces of size {split_size} do not fit a dimension of size {dim_size}"
                    ),
                )
            })?;
    }
    split_with_sizes_backward(client, grads, &split_sizes, dim, sizes, dtype, device)
}

/// Gradient of `split_with_sizes(input, split_sizes, dim)`.
///
/// Undefined piece gradients become zeros shaped like their piece; all
/// pieces are then concatenated along `dim`.
pub fn split_with_sizes_backward<R>(
    client: &R::Client,
    grads: &[Option<Tensor<R>>],
    split_sizes: &[usize],
    dim: isize,
    sizes: &[usize],
    dtype: DType,
    device: &R::Device,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("split_with_sizes_backward", ?split_sizes, dim).entered();
    let dim_idx = wrap_dim(dim, sizes.len())?;
    if grads.len() != split_sizes.len() {
        return Err(Error::invalid_argument(
            "grads",
            format!(
                "got {} gradients for {} pieces",
                grads.len(),
                split_sizes.len()
            ),
        ));
    }
    let total: usize = split_sizes.iter().sum();
    if total != sizes[dim_idx] {
        return Err(Error::invalid_argument(
            "split_sizes",
            format!(
                "split sizes {split_sizes:?} sum to {total}, dimension {dim_idx} has size {}",
                sizes[dim_idx]
            ),
        ));
    }

    let pieces = grads
        .iter()
        .zip(split_sizes)
        .enumerate()
        .map(|(i, (grad, &length))| {
            let mut shape = sizes.to_vec();
            shape[dim_idx] = length;
            match grad {
                Some(g) if g.shape() != shape.as_slice() => Err(Error::invalid_argument(
                    "grads",
                    format!(
                        "gradient {i} has shape {:?}, its piece has shape {shape:?}",
                        g.shape()
                    ),
                )),
                Some(g) => Ok(g.clone()),
                None => Ok(Tensor::zeros(&shape, dtype, device)),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    let refs: Vec<&Tensor<R>> = pieces.iter().collect();
    client.cat(&refs, dim_idx as isize)
}

// ============================================================================
// cat
// ============================================================================

/// Gradient of `cat(tensors, dim)`: one narrow view of `grad` per input.
///
/// `sizes` holds the input shapes in order. Inputs of shape `[0]` took no
/// part in the concatenation and get an empty `[0]` gradient. `dim` is
/// wrapped against the first input whose shape is not `[0]`.
pub fn cat_tensors_backward<R: Runtime>(
    grad: &Tensor<R>,
    sizes: &[Vec<usize>],
    dim: isize,
) -> Result<Vec<Tensor<R>>> {
    let _span = trace_span!("cat_tensors_backward", inputs = sizes.len(), dim).entered();
    let empty = || Tensor::zeros(&[0], grad.dtype(), grad.device());

    let Some(reference) = sizes.iter().find(|s| !is_legacy_empty(s)) else {
        return Ok(sizes.iter().map(|_| empty()).collect());
    };
    let dim_idx = wrap_dim(dim, reference.len())?;

    let mut offset = 0;
    let mut grad_inputs = Vec::with_capacity(sizes.len());
    for shape in sizes {
        if is_legacy_empty(shape) {
            grad_inputs.push(empty());
            continue;
        }
        if shape.len() != reference.len() {
            return Err(Error::invalid_argument(
                "sizes",
                format!(
                    "input shape {shape:?} has rank {}, expected rank {} like {reference:?}",
                    shape.len(),
                    reference.len()
                ),
            ));
        }
        let length = shape[dim_idx];
        grad_inputs.push(grad.narrow(dim_idx as isize, offset, length)?);
        offset += length;
    }
    Ok(grad_inputs)
}

// ============================================================================
// slice / roll
// ============================================================================

/// Gradient of `input.slice(dim, start, end, step)`.
///
/// A zero tensor of `input_sizes` with the slice overwritten by `grad`.
pub fn slice_backward<R>(
    client: &R::Client,
    grad: &Tensor<R>,
    input_sizes: &[usize],
    dim: isize,
    start: isize,
    end: isize,
    step: isize,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("slice_backward", dim, start, end, step).entered();
    let zeros = Tensor::zeros(input_sizes, grad.dtype(), grad.device());
    client.slice_scatter(&zeros, grad, dim, start, end, step)
}

/// Gradient of `roll(input, shifts, dims)`: roll back by the negated shifts
pub fn roll_backward<R>(
    client: &R::Client,
    grad: &Tensor<R>,
    shifts: &[i64],
    dims: &[isize],
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    let _span = trace_span!("roll_backward", ?shifts, ?dims).entered();
    let negated: Vec<i64> = shifts.iter().map(|s| -s).collect();
    client.roll(grad, &negated, dims)
}

/// [`roll_backward`] for a single `(shift, dim)` pair
pub fn roll_backward_one_dim<R>(
    client: &R::Client,
    grad: &Tensor<R>,
    shift: i64,
    dim: isize,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    roll_backward(client, grad, &[shift], &[dim])
}

/// Roll along a single dimension
pub fn roll_one_dim<R>(
    client: &R::Client,
    tensor: &Tensor<R>,
    shift: i64,
    dim: isize,
) -> Result<Tensor<R>>
where
    R: Runtime,
    R::Client: TensorOps<R>,
{
    client.roll(tensor, &[shift], &[dim])
}

// ============================================================================
// SplitBackward / SplitWithSizesBackward
// ============================================================================

/// Backward for `split(a, split_size, dim)`
pub struct SplitBackward<R: Runtime> {
    split_size: usize,
    dim: isize,
    input_shape: Vec<usize>,
    dtype: DType,
    device: R::Device,
}

impl<R: Runtime> SplitBackward<R> {
    /// Create a new SplitBackward
    pub fn new(input: &Tensor<R>, split_size: usize, dim: isize) -> Self {
        Self {
            split_size,
            dim,
            input_shape: input.shape().to_vec(),
            dtype: input.dtype(),
            device: input.device().clone(),
        }
    }
}

impl<R: Runtime> GradFn<R> for SplitBackward<R>
where
    R::Client: TensorOps<R>,
{
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        if grad_outputs.iter().all(Option::is_none) {
            return Ok(vec![None]);
        }
        let client = R::default_client(&self.device);
        let grad_input = split_backward(
            &client,
            grad_outputs,
            self.split_size,
            self.dim,
            &self.input_shape,
            self.dtype,
            &self.device,
        )?;
        Ok(vec![Some(grad_input)])
    }

    fn name(&self) -> &'static str {
        "SplitBackward"
    }
}

/// Backward for `split_with_sizes(a, split_sizes, dim)` (and `chunk`)
pub struct SplitWithSizesBackward<R: Runtime> {
    split_sizes: Vec<usize>,
    dim: isize,
    input_shape: Vec<usize>,
    dtype: DType,
    device: R::Device,
}

impl<R: Runtime> SplitWithSizesBackward<R> {
    /// Create a new SplitWithSizesBackward
    pub fn new(input: &Tensor<R>, split_sizes: &[usize], dim: isize) -> Self {
        Self {
            split_sizes: split_sizes.to_vec(),
            dim,
            input_shape: input.shape().to_vec(),
            dtype: input.dtype(),
            device: input.device().clone(),
        }
    }
}

impl<R: Runtime> GradFn<R> for SplitWithSizesBackward<R>
where
    R::Client: TensorOps<R>,
{
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        if grad_outputs.iter().all(Option::is_none) {
            return Ok(vec![None]);
        }
        let client = R::default_client(&self.device);
        let grad_input = split_with_sizes_backward(
            &client,
            grad_outputs,
            &self.split_sizes,
            self.dim,
            &self.input_shape,
            self.dtype,
            &self.device,
        )?;
        Ok(vec![Some(grad_input)])
    }

    fn name(&self) -> &'static str {
        "SplitWithSizesBackward"
    }
}

// ============================================================================
// CatBackward
// ============================================================================

/// Backward for `cat(tensors, dim)`
pub struct CatBackward {
    input_shapes: Vec<Vec<usize>>,
    dim: isize,
}

impl CatBackward {
    /// Create a new CatBackward from the shapes of the concatenated inputs
    pub fn new(input_shapes: Vec<Vec<usize>>, dim: isize) -> Self {
        Self { input_shapes, dim }
    }
}

impl<R: Runtime> GradFn<R> for CatBackward {
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        let Some(grad) = single_grad(grad_outputs) else {
            return Ok(vec![None; self.input_shapes.len()]);
        };
        let grads = cat_tensors_backward(grad, &self.input_shapes, self.dim)?;
        Ok(grads.into_iter().map(Some).collect())
    }

    fn name(&self) -> &'static str {
        "CatBackward"
    }
}

// ============================================================================
// SliceBackward
// ============================================================================

/// Backward for `a.slice(dim, start, end, step)`
pub struct SliceBackward {
    input_shape: Vec<usize>,
    dim: isize,
    start: isize,
    end: isize,
    step: isize,
}

impl SliceBackward {
    /// Create a new SliceBackward
    pub fn new(input_shape: &[usize], dim: isize, start: isize, end: isize, step: isize) -> Self {
        Self {
            input_shape: input_shape.to_vec(),
            dim,
            start,
            end,
            step,
        }
    }
}

impl<R: Runtime> GradFn<R> for SliceBackward
where
    R::Client: TensorOps<R>,
{
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        let Some(grad) = single_grad(grad_outputs) else {
            return Ok(vec![None]);
        };
        let client = R::default_client(grad.device());
        let grad_input = slice_backward(
            &client,
            grad,
            &self.input_shape,
            self.dim,
            self.start,
            self.end,
            self.step,
        )?;
        Ok(vec![Some(grad_input)])
    }

    fn name(&self) -> &'static str {
        "SliceBackward"
    }
}

// ============================================================================
// RollBackward
// ============================================================================

/// Backward for `roll(a, shifts, dims)`
pub struct RollBackward {
    shifts: Vec<i64>,
    dims: Vec<isize>,
}

impl RollBackward {
    /// Create a new RollBackward
    pub fn new(shifts: &[i64], dims: &[isize]) -> Self {
        Self {
            shifts: shifts.to_vec(),
            dims: dims.to_vec(),
        }
    }
}

impl<R: Runtime> GradFn<R> for RollBackward
where
    R::Client: TensorOps<R>,
{
    fn backward(&self, grad_outputs: &[Option<Tensor<R>>]) -> Result<Vec<Option<Tensor<R>>>> {
        let Some(grad) = single_grad(grad_outputs) else {
            return Ok(vec![None]);
        };
        let client = R::default_client(grad.device());
        let grad_input = roll_backward(&client, grad, &self.shifts, &self.dims)?;
        Ok(vec![Some(grad_input)])
    }

    fn name(&self) -> &'static str {
        "RollBackward"
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};
    use crate::runtime::shape_ops::split;

    fn seq(shape: &[usize], device: &CpuDevice) -> Tensor<CpuRuntime> {
        let n: usize = shape.iter().product();
        let data: Vec<f64> = (0..n).map(|i| i as f64).collect();
        Tensor::from_slice(&data, shape, device)
    }

    #[test]
    fn test_split_backward_fills_undefined() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let g0 = Tensor::<CpuRuntime>::ones(&[2, 2], DType::F64, &device);
        let g2 = Tensor::<CpuRuntime>::full_scalar(&[2, 1], DType::F64, 3.0, &device);
        let grads = [Some(g0), None, Some(g2)];

        let g = split_backward(&client, &grads, 2, -1, &[2, 5], DType::F64, &device).unwrap();
        assert_eq!(g.shape(), &[2, 5]);
        assert_eq!(
            g.to_vec::<f64>(),
            vec![1.0, 1.0, 0.0, 0.0, 3.0, 1.0, 1.0, 0.0, 0.0, 3.0]
        );
    }

    #[test]
    fn test_split_backward_round_trip() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let t = seq(&[7, 2], &device);
        let pieces: Vec<Option<Tensor<CpuRuntime>>> =
            split(&t, 3, 0).unwrap().into_iter().map(Some).collect();
        let g = split_backward(&client, &pieces, 3, 0, &[7, 2], DType::F64, &device).unwrap();
        assert_eq!(g.to_vec::<f64>(), t.to_vec::<f64>());
    }

    #[test]
    fn test_split_with_sizes_backward_count_mismatch() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let grads: [Option<Tensor<CpuRuntime>>; 1] = [None];
        assert!(matches!(
            split_with_sizes_backward(&client, &grads, &[1, 2], 0, &[3], DType::F64, &device),
            Err(Error::InvalidArgument { arg: "grads", .. })
        ));
    }

    #[test]
    fn test_split_with_sizes_backward_sizes_must_cover_dim() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let grads: [Option<Tensor<CpuRuntime>>; 2] = [None, None];
        assert!(matches!(
            split_with_sizes_backward(&client, &grads, &[1, 1], 0, &[5], DType::F64, &device),
            Err(Error::InvalidArgument {
                arg: "split_sizes",
                ..
            })
        ));
    }

    #[test]
    fn test_split_with_sizes_backward_grad_shape_mismatch() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let wrong = Tensor::<CpuRuntime>::ones(&[3], DType::F64, &device);
        let grads = [Some(wrong), None];
        assert!(matches!(
            split_with_sizes_backward(&client, &grads, &[2, 3], 0, &[5], DType::F64, &device),
            Err(Error::InvalidArgument { arg: "grads", .. })
        ));
    }

    #[test]
    fn test_cat_backward_offsets() {
        let device = CpuDevice::new();
        let grad = seq(&[6, 4], &device);
        let sizes = vec![vec![2, 4], vec![3, 4], vec![1, 4]];
        let grads = cat_tensors_backward(&grad, &sizes, 0).unwrap();
        assert_eq!(grads.len(), 3);
        assert_eq!(grads[0].shape(), &[2, 4]);
        assert_eq!(grads[1].shape(), &[3, 4]);
        assert_eq!(grads[2].shape(), &[1, 4]);
        assert_eq!(grads[1].to_vec::<f64>()[0], 8.0);
        assert_eq!(grads[2].to_vec::<f64>(), vec![20.0, 21.0, 22.0, 23.0]);
    }

    #[test]
    fn test_cat_backward_legacy_empty() {
        let device = CpuDevice::new();
        let grad = seq(&[2, 3], &device);
        let sizes = vec![vec![0], vec![2, 1], vec![0], vec![2, 2]];
        let grads = cat_tensors_backward(&grad, &sizes, -1).unwrap();
        assert_eq!(grads[0].shape(), &[0]);
        assert_eq!(grads[1].to_vec::<f64>(), vec![0.0, 3.0]);
        assert_eq!(grads[2].shape(), &[0]);
        assert_eq!(grads[3].to_vec::<f64>(), vec![1.0, 2.0, 4.0, 5.0]);

        // Every input empty: the dim is never wrapped
        let grads = cat_tensors_backward(&grad, &[vec![0], vec![0]], 9).unwrap();
        assert!(grads.iter().all(|g| g.shape() == [0]));
    }

    #[test]
    fn test_cat_backward_rank_mismatch() {
        let device = CpuDevice::new();
        let grad = Tensor::<CpuRuntime>::ones(&[2, 3], DType::F64, &device);
        assert!(matches!(
            cat_tensors_backward(&grad, &[vec![2, 2], vec![1]], 1),
            Err(Error::InvalidArgument { arg: "sizes", .. })
        ));
    }

    #[test]
    fn test_slice_backward() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let grad = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0], &[2], &device);
        let g = slice_backward(&client, &grad, &[5], 0, 1, 4, 2).unwrap();
        assert_eq!(g.to_vec::<f64>(), vec![0.0, 1.0, 0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_roll_backward_inverts_roll() {
        let device = CpuDevice::new();
        let client = CpuRuntime::default_client(&device);
        let t = seq(&[3, 4], &device);
        let rolled = roll_one_dim(&client, &t, 5, -1).unwrap();
        let back = roll_backward_one_dim(&client, &rolled, 5, -1).unwrap();
        assert_eq!(back.to_vec::<f64>(), t.to_vec::<f64>());

        let node = RollBackward::new(&[1, -2], &[0, 1]);
        let rolled = client.roll(&t, &[1, -2], &[0, 1]).unwrap();
        let grads = GradFn::<CpuRuntime>::backward(&node, &[Some(rolled)]).unwrap();
        assert_eq!(grads[0].as_ref().unwrap().to_vec::<f64>(), t.to_vec::<f64>());
    }

    #[test]
    fn test_split_node_all_undefined() {
        let device = CpuDevice::new();
        let t = seq(&[4], &device);
        let node = SplitBackward::new(&t, 2, 0);
        assert!(node.backward(&[None, None]).unwrap()[0].is_none());
        let grads = node
            .backward(&[None, Some(Tensor::ones(&[2], DType::F64, &device))])
            .unwrap();
        assert_eq!(
            grads[0].as_ref().unwrap().to_vec::<f64>(),
            vec![0.0, 0.0, 1.0, 1.0]
        );
    }
}
