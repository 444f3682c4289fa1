//! Core Tensor type

use super::layout::normalize_slice;
use super::{Layout, Storage, StorageFormat};
use crate::dims::wrap_dim;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::fmt;

/// N-dimensional array handle
///
/// `Tensor` consists of:
/// - **Storage**: Reference-counted element buffer
/// - **Layout**: Shape, strides, and offset defining the view into storage
///
/// Backward formulas only read a tensor's metadata and pass it to the
/// runtime client's operations. View operations (`transpose`, `narrow`,
/// `broadcast_to`, ...) are zero-copy and share storage with their source.
pub struct Tensor<R: Runtime> {
    storage: Storage<R>,
    layout: Layout,
}

impl<R: Runtime> Tensor<R> {
    /// Create a tensor from storage and layout
    pub fn from_parts(storage: Storage<R>, layout: Layout) -> Self {
        Self { storage, layout }
    }

    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape` dimensions.
    /// For a fallible alternative, use [`Self::try_from_slice`].
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize], device: &R::Device) -> Self {
        Self::try_from_slice(data, shape, device).expect("Tensor::from_slice failed")
    }

    /// Create a tensor from a slice of data (fallible version)
    pub fn try_from_slice<T: Element>(
        data: &[T],
        shape: &[usize],
        device: &R::Device,
    ) -> Result<Self> {
        let values = data.iter().map(|v| v.to_f64()).collect();
        Self::from_values(values, shape, T::DTYPE, device)
    }

    /// Create a contiguous tensor from `f64` values, rounded to `dtype`
    pub fn from_values(
        values: Vec<f64>,
        shape: &[usize],
        dtype: DType,
        device: &R::Device,
    ) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if values.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![values.len()],
            });
        }
        Ok(Self {
            storage: Storage::from_values(values, dtype, device),
            layout: Layout::contiguous(shape),
        })
    }

    /// Create a tensor filled with a scalar value
    pub fn full_scalar(shape: &[usize], dtype: DType, value: f64, device: &R::Device) -> Self {
        let len: usize = shape.iter().product();
        Self {
            storage: Storage::from_values(vec![value; len], dtype, device),
            layout: Layout::contiguous(shape),
        }
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Self {
        Self::full_scalar(shape, dtype, 0.0, device)
    }

    /// Create a tensor filled with ones
    pub fn ones(shape: &[usize], dtype: DType, device: &R::Device) -> Self {
        Self::full_scalar(shape, dtype, 1.0, device)
    }

    /// Zero tensor with this tensor's shape, dtype and device
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.shape(), self.dtype(), self.device())
    }

    // ===== Accessors =====

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        self.storage.device()
    }

    /// Check if the tensor is contiguous in memory
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Check if this is a scalar (0-dimensional tensor)
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.layout.is_scalar()
    }

    /// Check if the tensor uses sparse storage
    #[inline]
    pub fn is_sparse(&self) -> bool {
        self.storage.format() == StorageFormat::Sparse
    }

    /// Get size along a dimension (supports negative indexing)
    pub fn size(&self, dim: isize) -> Option<usize> {
        self.layout
            .normalize_dim(dim)
            .map(|idx| self.layout.shape()[idx])
    }

    /// Same values tagged with a different storage format
    pub fn with_format(&self, format: StorageFormat) -> Self {
        Self {
            storage: self.storage.with_format(format),
            layout: self.layout.clone(),
        }
    }

    // ===== View Operations (Zero-Copy) =====

    fn with_layout(&self, layout: Layout) -> Self {
        Self {
            storage: self.storage.clone(),
            layout,
        }
    }

    /// Transpose two dimensions (zero-copy)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Self> {
        let ndim = self.ndim();
        let d0 = wrap_dim(dim0, ndim)? as isize;
        let d1 = wrap_dim(dim1, ndim)? as isize;
        let layout = self
            .layout
            .transpose(d0, d1)
            .ok_or(Error::InvalidDimension { dim: dim0, ndim })?;
        Ok(self.with_layout(layout))
    }

    /// Transpose last two dimensions (matrix transpose)
    pub fn t(&self) -> Result<Self> {
        self.transpose(-2, -1)
    }

    /// View with a different shape; fails if the tensor is not contiguous
    pub fn view(&self, shape: &[usize]) -> Result<Self> {
        let numel: usize = shape.iter().product();
        if numel != self.numel() {
            return Err(Error::shape_mismatch(shape, self.shape()));
        }
        let layout = self.layout.reshape(shape).ok_or(Error::NotContiguous)?;
        Ok(self.with_layout(layout))
    }

    /// Reshape, copying first when the tensor is not contiguous
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        if self.is_contiguous() {
            self.view(shape)
        } else {
            self.contiguous().view(shape)
        }
    }

    /// Remove dimensions of size 1
    pub fn squeeze(&self, dim: Option<isize>) -> Self {
        self.with_layout(self.layout.squeeze(dim))
    }

    /// Add a dimension of size 1
    pub fn unsqueeze(&self, dim: isize) -> Result<Self> {
        let layout = self
            .layout
            .unsqueeze(dim)
            .ok_or_else(|| Error::InvalidDimension {
                dim,
                ndim: self.ndim() + 1,
            })?;
        Ok(self.with_layout(layout))
    }

    /// Broadcast (expand) to a target shape without copying
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self> {
        let layout = self
            .layout
            .broadcast_to(shape)
            .ok_or_else(|| Error::shape_mismatch(shape, self.shape()))?;
        Ok(self.with_layout(layout))
    }

    /// Narrow a dimension to `length` elements starting at `start` (zero-copy)
    pub fn narrow(&self, dim: isize, start: usize, length: usize) -> Result<Self> {
        let idx = wrap_dim(dim, self.ndim())?;
        let layout = self.layout.narrow(idx, start, length).ok_or_else(|| {
            Error::invalid_argument(
                "start",
                format!(
                    "narrow range {}..{} exceeds size {} of dimension {}",
                    start,
                    start + length,
                    self.shape()[idx],
                    idx
                ),
            )
        })?;
        Ok(self.with_layout(layout))
    }

    /// Strided slice `start..end` by `step` along `dim` (zero-copy)
    ///
    /// Negative bounds count from the end; bounds are clamped to the dimension.
    pub fn slice(&self, dim: isize, start: isize, end: isize, step: isize) -> Result<Self> {
        if step <= 0 {
            return Err(Error::invalid_argument(
                "step",
                format!("slice step must be positive, got {step}"),
            ));
        }
        let idx = wrap_dim(dim, self.ndim())?;
        let step = step as usize;
        let (start, length) = normalize_slice(self.shape()[idx], start, end, step);
        let layout = self
            .layout
            .slice(idx, start, length, step)
            .ok_or(Error::InvalidDimension {
                dim,
                ndim: self.ndim(),
            })?;
        Ok(self.with_layout(layout))
    }

    /// Materialize into contiguous storage (no copy if already contiguous)
    pub fn contiguous(&self) -> Self {
        if self.is_contiguous() {
            return self.clone();
        }
        let mut out = Self {
            storage: Storage::from_values(self.values(), self.dtype(), self.device()),
            layout: Layout::contiguous(self.shape()),
        };
        if self.is_sparse() {
            out = out.with_format(StorageFormat::Sparse);
        }
        out
    }

    // ===== Data Access =====

    /// Elements as `f64`, in row-major logical order
    pub fn values(&self) -> Vec<f64> {
        let data = self.storage.values();
        if self.is_contiguous() {
            let start = self.layout.offset();
            return data[start..start + self.numel()].to_vec();
        }
        self.layout.offsets().into_iter().map(|i| data[i]).collect()
    }

    /// Copy elements to a host vector of `T`, in row-major logical order
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        self.values().into_iter().map(T::from_f64).collect()
    }

    /// Extract the single element of a one-element tensor
    pub fn item<T: Element>(&self) -> Result<T> {
        if self.numel() != 1 {
            return Err(Error::shape_mismatch(&[], self.shape()));
        }
        Ok(T::from_f64(self.values()[0]))
    }
}

impl<R: Runtime> Clone for Tensor<R> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            layout: self.layout.clone(),
        }
    }
}

impl<R: Runtime> fmt::Debug for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("dtype", &self.dtype())
            .field("format", &self.storage.format())
            .finish()
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    #[test]
    fn test_views_share_storage() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &device);
        let tt = t.t().unwrap();
        assert!(tt.storage().ptr_eq(t.storage()));
        assert_eq!(tt.shape(), &[3, 2]);
        assert_eq!(tt.to_vec::<f64>(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_view_requires_contiguous() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::zeros(&[2, 3], DType::F32, &device);
        assert!(matches!(t.t().unwrap().view(&[6]), Err(Error::NotContiguous)));
        assert_eq!(t.t().unwrap().reshape(&[6]).unwrap().shape(), &[6]);
    }

    #[test]
    fn test_slice_with_step() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::from_slice(&[0.0f64, 1.0, 2.0, 3.0, 4.0, 5.0], &[6], &device);
        let s = t.slice(0, 1, -1, 2).unwrap();
        assert_eq!(s.to_vec::<f64>(), vec![1.0, 3.0]);
        assert!(matches!(t.slice(0, 0, 6, 0), Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_half_values_are_rounded() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::from_values(vec![0.1], &[1], DType::F16, &device).unwrap();
        assert_eq!(t.item::<f64>().unwrap(), half::f16::from_f64(0.1).to_f64());
    }

    #[test]
    fn test_sparse_format_tag() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::zeros(&[2, 2], DType::F64, &device);
        assert!(!t.is_sparse());
        assert!(t.with_format(StorageFormat::Sparse).is_sparse());
    }
}
