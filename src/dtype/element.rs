//! Element trait for mapping Rust types to DType

use super::DType;

/// Trait for types that can be elements of a tensor
///
/// This trait connects Rust's type system to numgrad's runtime dtype system.
/// Kernels work on `f64` and convert at the boundary.
pub trait Element: Copy + Send + Sync + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for generic numeric operations
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    fn from_f64(v: f64) -> Self;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Element for half::f16 {
    const DTYPE: DType = DType::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        half::f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }
}

impl Element for half::bf16 {
    const DTYPE: DType = DType::BF16;

    #[inline]
    fn to_f64(self) -> f64 {
        half::bf16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::bf16::from_f64(v)
    }
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    #[inline]
    fn to_f64(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v != 0.0
    }
}
