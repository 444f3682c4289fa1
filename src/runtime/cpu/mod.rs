//! CPU runtime implementation
//!
//! The CPU runtime keeps elements in host memory and provides a reference
//! implementation for every operation trait in [`crate::ops`].
//!
//! # Broadcasting
//!
//! NumPy-style broadcasting is supported for binary arithmetic, comparison
//! and `where_cond`. Shapes are right-aligned and expanded where one operand
//! has size 1.
//!
//! # Non-contiguous Tensors
//!
//! Operations read their inputs in logical row-major order through the
//! layout, so transposed, narrowed, strided and broadcast (stride-0) views
//! are all accepted. Outputs are always freshly allocated and contiguous.
//!
//! # Precision
//!
//! Kernels compute in `f64` and round each output element to the tensor's
//! dtype when the result storage is created.

mod client;
mod device;
pub(crate) mod helpers;
mod ops;
mod runtime;

pub use crate::tensor::Tensor;
pub use client::CpuClient;
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
