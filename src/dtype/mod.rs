//! Data type system for numgrad tensors
//!
//! `DType` is the runtime element type carried by every tensor. The CPU
//! reference runtime keeps values as `f64` and rounds them to the tensor's
//! dtype on every write, so reduced-precision results match what a native
//! kernel of that width would produce.

mod element;

pub use element::Element;

use std::fmt;

// ============================================================================
// DType Enum
// ============================================================================

/// Data types supported by numgrad tensors
///
/// # Discriminant Values (Serialization Stability)
///
/// - Floats: 0-9 (F64=0, F32=1, F16=2, BF16=3)
/// - Bool: 30
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point (most common)
    F32 = 1,
    /// 16-bit floating point (IEEE 754)
    F16 = 2,
    /// 16-bit brain floating point
    BF16 = 3,
    /// Boolean type, used for masks
    Bool = 30,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F64 => 8,
            Self::F32 => 4,
            Self::F16 | Self::BF16 => 2,
            Self::Bool => 1,
        }
    }

    /// Returns true if this is a floating point type
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F64 | Self::F32 | Self::F16 | Self::BF16)
    }

    /// Returns true for the 16-bit float types (F16, BF16)
    #[inline]
    pub const fn is_half(self) -> bool {
        matches!(self, Self::F16 | Self::BF16)
    }

    /// Returns true if this is a boolean type
    #[inline]
    pub const fn is_bool(self) -> bool {
        matches!(self, Self::Bool)
    }

    /// Get the default dtype for floating point operations
    #[inline]
    pub const fn default_float() -> Self {
        Self::F32
    }

    /// Round an `f64` value to the nearest value representable in this dtype
    #[inline]
    pub fn round(self, v: f64) -> f64 {
        match self {
            Self::F64 => v,
            Self::F32 => v as f32 as f64,
            Self::F16 => half::f16::from_f64(v).to_f64(),
            Self::BF16 => half::bf16::from_f64(v).to_f64(),
            Self::Bool => {
                if v != 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Short name of the dtype
    pub const fn name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::F16 => "f16",
            Self::BF16 => "bf16",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
