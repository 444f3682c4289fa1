//! Layout: shape, strides, and offset for tensor memory layout

use smallvec::SmallVec;
use std::fmt;

/// Stack allocation threshold for dimensions
/// Most tensors have 4 or fewer dimensions, so we stack-allocate up to 4
const STACK_DIMS: usize = 4;

/// Shape type: dimensions of a tensor
pub type Shape = SmallVec<[usize; STACK_DIMS]>;

/// Strides type: element offsets between consecutive elements along each dimension
///
/// Strides are in ELEMENTS, not bytes. A stride of 0 marks a broadcast dimension.
pub type Strides = SmallVec<[isize; STACK_DIMS]>;

/// Layout describes the memory layout of a tensor
///
/// Address of element at indices [i0, i1, ..., in]:
///   offset + i0 * strides[0] + i1 * strides[1] + ... + in * strides[n]
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Shape,
    strides: Strides,
    offset: usize,
}

impl Layout {
    /// Create a new contiguous (row-major/C-order) layout from a shape
    ///
    /// # Example
    /// ```
    /// use numgrad::tensor::Layout;
    /// let layout = Layout::contiguous(&[2, 3, 4]);
    /// assert_eq!(layout.shape(), &[2, 3, 4]);
    /// assert_eq!(layout.strides(), &[12, 4, 1]);
    /// ```
    pub fn contiguous(shape: &[usize]) -> Self {
        let shape: Shape = shape.iter().copied().collect();
        let strides = Self::compute_contiguous_strides(&shape);
        Self {
            shape,
            strides,
            offset: 0,
        }
    }

    /// Create a layout with explicit shape, strides, and offset
    pub fn new(shape: Shape, strides: Strides, offset: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            shape,
            strides,
            offset,
        }
    }

    /// Compute contiguous strides for a given shape (row-major order)
    fn compute_contiguous_strides(shape: &[usize]) -> Strides {
        let mut strides: Strides = SmallVec::with_capacity(shape.len());
        let mut stride = 1isize;
        for &dim in shape.iter().rev() {
            strides.push(stride);
            stride *= dim.max(1) as isize;
        }
        strides.reverse();
        strides
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Get the offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Check if the tensor is a scalar (0 dimensions)
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Check if memory is contiguous (row-major order)
    ///
    /// Strides of size-1 dimensions never affect addressing and are ignored.
    /// Empty tensors are always contiguous.
    pub fn is_contiguous(&self) -> bool {
        if self.elem_count() == 0 {
            return true;
        }
        let mut expected = 1isize;
        for (&size, &stride) in self.shape.iter().zip(self.strides.iter()).rev() {
            if size == 1 {
                continue;
            }
            if stride != expected {
                return false;
            }
            expected *= size as isize;
        }
        true
    }

    /// Normalize a dimension index (handle negative indices)
    pub fn normalize_dim(&self, d: isize) -> Option<usize> {
        let ndim = self.ndim() as isize;
        let idx = if d < 0 { ndim + d } else { d };
        if idx >= 0 && idx < ndim {
            Some(idx as usize)
        } else {
            None
        }
    }

    /// Storage indices of every element, in row-major logical order
    pub fn offsets(&self) -> Vec<usize> {
        let count = self.elem_count();
        let mut out = Vec::with_capacity(count);
        if count == 0 {
            return out;
        }
        let ndim = self.ndim();
        let mut index = vec![0usize; ndim];
        let mut linear = self.offset as isize;
        for _ in 0..count {
            out.push(linear as usize);
            // Odometer increment from the innermost dimension
            for d in (0..ndim).rev() {
                index[d] += 1;
                linear += self.strides[d];
                if index[d] < self.shape[d] {
                    break;
                }
                linear -= self.strides[d] * self.shape[d] as isize;
                index[d] = 0;
            }
        }
        out
    }

    /// Create a transposed layout (swap two dimensions)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Option<Self> {
        let d0 = self.normalize_dim(dim0)?;
        let d1 = self.normalize_dim(dim1)?;

        let mut new_shape = self.shape.clone();
        let mut new_strides = self.strides.clone();
        new_shape.swap(d0, d1);
        new_strides.swap(d0, d1);

        Some(Self {
            shape: new_shape,
            strides: new_strides,
            offset: self.offset,
        })
    }

    /// Create a reshaped layout (if contiguous)
    ///
    /// Returns None if the tensor is not contiguous or element counts differ.
    pub fn reshape(&self, new_shape: &[usize]) -> Option<Self> {
        if !self.is_contiguous() {
            return None;
        }
        let new_count: usize = new_shape.iter().product();
        if new_count != self.elem_count() {
            return None;
        }
        let mut layout = Self::contiguous(new_shape);
        layout.offset = self.offset;
        Some(layout)
    }

    /// Create a squeezed layout (remove dimensions of size 1)
    pub fn squeeze(&self, dim: Option<isize>) -> Self {
        match dim {
            Some(d) => {
                if let Some(idx) = self.normalize_dim(d) {
                    if self.shape[idx] == 1 {
                        let mut new_shape = self.shape.clone();
                        let mut new_strides = self.strides.clone();
                        new_shape.remove(idx);
                        new_strides.remove(idx);
                        return Self::new(new_shape, new_strides, self.offset);
                    }
                }
                self.clone()
            }
            None => {
                let mut new_shape = Shape::new();
                let mut new_strides = Strides::new();
                for (&s, &st) in self.shape.iter().zip(self.strides.iter()) {
                    if s != 1 {
                        new_shape.push(s);
                        new_strides.push(st);
                    }
                }
                Self::new(new_shape, new_strides, self.offset)
            }
        }
    }

    /// Create an unsqueezed layout (add dimension of size 1)
    ///
    /// Valid positions are `-(ndim + 1)..=ndim`.
    pub fn unsqueeze(&self, dim: isize) -> Option<Self> {
        let ndim = self.ndim();
        let idx = if dim < 0 {
            ndim as isize + dim + 1
        } else {
            dim
        };
        if idx < 0 || idx as usize > ndim {
            return None;
        }
        let idx = idx as usize;

        let mut new_shape = self.shape.clone();
        let mut new_strides = self.strides.clone();

        let new_stride = if idx < ndim {
            new_strides[idx] * new_shape[idx].max(1) as isize
        } else {
            1
        };

        new_shape.insert(idx, 1);
        new_strides.insert(idx, new_stride);

        Some(Self::new(new_shape, new_strides, self.offset))
    }

    /// Create a broadcast layout to a target shape
    ///
    /// Returns None if shapes are not broadcastable
    pub fn broadcast_to(&self, target: &[usize]) -> Option<Self> {
        if target.len() < self.ndim() {
            return None;
        }

        let mut new_shape = Shape::new();
        let mut new_strides = Strides::new();

        let pad = target.len() - self.ndim();
        for &t in &target[..pad] {
            new_shape.push(t);
            new_strides.push(0);
        }

        for ((&s, &st), &t) in self
            .shape
            .iter()
            .zip(self.strides.iter())
            .zip(&target[pad..])
        {
            if s == t {
                new_shape.push(t);
                new_strides.push(st);
            } else if s == 1 {
                new_shape.push(t);
                new_strides.push(0);
            } else {
                return None;
            }
        }

        Some(Self::new(new_shape, new_strides, self.offset))
    }

    /// Narrow dimension `dim` to `length` elements starting at `start`
    pub fn narrow(&self, dim: usize, start: usize, length: usize) -> Option<Self> {
        if dim >= self.ndim() || start + length > self.shape[dim] {
            return None;
        }
        let mut new_shape = self.shape.clone();
        new_shape[dim] = length;
        let offset = if length == 0 {
            self.offset
        } else {
            (self.offset as isize + start as isize * self.strides[dim]) as usize
        };
        Some(Self::new(new_shape, self.strides.clone(), offset))
    }

    /// Take every `step`-th element of `dim`, `length` of them, from `start`
    ///
    /// Bounds are expected to be normalized with [`normalize_slice`].
    pub fn slice(&self, dim: usize, start: usize, length: usize, step: usize) -> Option<Self> {
        if dim >= self.ndim() || step == 0 {
            return None;
        }
        if length > 0 && start + (length - 1) * step >= self.shape[dim] {
            return None;
        }
        let mut new_shape = self.shape.clone();
        let mut new_strides = self.strides.clone();
        new_shape[dim] = length;
        new_strides[dim] = self.strides[dim] * step as isize;
        let offset = if length == 0 {
            self.offset
        } else {
            (self.offset as isize + start as isize * self.strides[dim]) as usize
        };
        Some(Self::new(new_shape, new_strides, offset))
    }
}

/// Normalize slice bounds against a dimension of `size` elements.
///
/// Negative `start`/`end` count from the end, both are clamped into
/// `[0, size]`, and an `end` before `start` yields an empty range.
/// Returns `(start, length)`; `step` must be positive.
pub fn normalize_slice(size: usize, start: isize, end: isize, step: usize) -> (usize, usize) {
    debug_assert!(step > 0);
    let size_i = size as isize;
    let clamp = |v: isize| -> usize {
        let v = if v < 0 { v + size_i } else { v };
        v.clamp(0, size_i) as usize
    };
    let start = clamp(start);
    let end = clamp(end).max(start);
    let length = (end - start).div_ceil(step);
    (start, length)
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout {{ shape: {:?}, strides: {:?}, offset: {} }}",
            self.shape.as_slice(),
            self.strides.as_slice(),
            self.offset
        )
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.shape.as_slice())
    }
}
