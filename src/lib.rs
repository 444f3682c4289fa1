//! # numgrad
//!
//! **Reverse-mode gradient formulas for tensor operations, written once
//! against a backend-agnostic runtime.**
//!
//! numgrad provides the numerical core an autograd engine dispatches to when
//! it walks a graph backwards: the vector-Jacobian products of individual
//! operations, the broadcasting shape algebra they rely on, and a
//! rank-polymorphic `matmul` that lowers to fixed-rank primitives.
//!
//! ## Features
//!
//! - **Shape algebra**: dimension wrapping, broadcast shape inference,
//!   dimension bitsets, sum-to-shape reduction
//! - **Gradient catalog**: pow, atan2, sum, split/chunk, cat, slice, roll,
//!   mm/matmul, symmetric eigendecomposition, softmax with a requested dtype
//! - **Matmul dispatch**: dot, mv, vm, mm, folded mm and batched mm selected
//!   by operand rank
//! - **Gradient nodes**: each formula is also a [`autograd::GradFn`] that
//!   captures its forward values
//!
//! ## Quick Start
//!
//! ```rust
//! use numgrad::prelude::*;
//! use numgrad::autograd::pow_backward;
//!
//! let device = CpuDevice::new();
//! let client = CpuRuntime::default_client(&device);
//!
//! let x = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0], &[3], &device);
//! let grad = Tensor::<CpuRuntime>::ones(&[3], DType::F64, &device);
//!
//! // d/dx x^2 = 2x
//! let g = pow_backward(&client, &grad, &x, 2.0)?;
//! assert_eq!(g.to_vec::<f64>(), vec![2.0, 4.0, 6.0]);
//! # Ok::<(), numgrad::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU reference runtime
//! - `rayon` (default): batch-parallel CPU matmul

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod autograd;
pub mod dims;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::autograd::GradFn;
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::ops::{
        ActivationOps, BinaryOps, CompareOps, ConditionalOps, IndexingOps, LinalgOps, MatmulOps,
        ReduceOps, ScalarOps, ShapeOps, TensorOps, TypeConversionOps, UnaryOps,
    };
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::tensor::{Layout, Tensor};

    #[cfg(feature = "cpu")]
    pub use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
}

/// Default runtime
#[cfg(feature = "cpu")]
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
