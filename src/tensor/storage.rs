//! Storage: reference-counted element buffers shared between views

use crate::dtype::DType;
use crate::runtime::Runtime;
use std::sync::Arc;

/// How the elements behind a tensor are organised
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum StorageFormat {
    /// Dense strided storage
    #[default]
    Strided,
    /// Sparse storage (COO-style). The reference runtime keeps the values
    /// dense-backed and only tracks the format tag.
    Sparse,
}

/// Storage for tensor data on a device
///
/// Storage wraps an element buffer with reference counting, enabling zero-copy
/// views (transpose, narrow, expand, etc.) that share the underlying buffer.
/// The buffer is never written after creation; operations that "write" build
/// a fresh storage.
pub struct Storage<R: Runtime> {
    inner: Arc<StorageInner<R>>,
}

struct StorageInner<R: Runtime> {
    /// Elements, already rounded to `dtype`
    values: Vec<f64>,
    dtype: DType,
    device: R::Device,
    format: StorageFormat,
}

impl<R: Runtime> Storage<R> {
    /// Create storage from values, rounding each to `dtype`
    pub fn from_values(mut values: Vec<f64>, dtype: DType, device: &R::Device) -> Self {
        if dtype != DType::F64 {
            for v in values.iter_mut() {
                *v = dtype.round(*v);
            }
        }
        Self {
            inner: Arc::new(StorageInner {
                values,
                dtype,
                device: device.clone(),
                format: StorageFormat::Strided,
            }),
        }
    }

    /// Storage sharing the same values with a different format tag
    pub fn with_format(&self, format: StorageFormat) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                values: self.inner.values.clone(),
                dtype: self.inner.dtype,
                device: self.inner.device.clone(),
                format,
            }),
        }
    }

    /// Raw element buffer
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.inner.values
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.values.len()
    }

    /// Check if storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.values.is_empty()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.inner.device
    }

    /// Get the storage format
    #[inline]
    pub fn format(&self) -> StorageFormat {
        self.inner.format
    }

    /// Check if two storages share the same buffer
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<R: Runtime> Clone for Storage<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
