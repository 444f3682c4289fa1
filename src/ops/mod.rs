//! Tensor operations
//!
//! This module defines the operation traits the gradient formulas are written
//! against, plus the rank-polymorphic matmul dispatcher built on top of them.
//!
//! # Design
//!
//! Operations are defined as traits that are implemented by `RuntimeClient`.
//! A formula only needs a client and tensor handles; it never touches memory
//! directly.
//!
//! ```text
//! RuntimeClient<R>
//!   └── implements TensorOps<R>
//!         ├── add, sub, mul, div, pow, atan2 (binary, broadcasting)
//!         ├── neg, exp, log, reciprocal      (unary)
//!         ├── dot, mv, mm, bmm               (fixed-rank matmul)
//!         ├── sum                            (reductions)
//!         ├── cat, roll, slice_scatter       (shape / indexing)
//!         ├── triu, tril, fill_diagonal      (structured matrices)
//!         └── softmax, log_softmax           (activations)
//! ```
//!
//! # Implementing Operations for a New Backend
//!
//! Implement each operation trait for your `Client` type. `TensorOps<R>` has
//! a blanket implementation, so a client that implements every family gets
//! it for free:
//!
//! ```ignore
//! impl BinaryOps<MyRuntime> for MyClient {
//!     fn add(&self, a: &Tensor<MyRuntime>, b: &Tensor<MyRuntime>) -> Result<Tensor<MyRuntime>> {
//!         let out_shape = infer_broadcast_shape(a.shape(), b.shape())?;
//!         // ... dispatch kernel
//!     }
//!     // ...
//! }
//! ```
//!
//! Backends dispatch on the kind enums [`BinaryOp`] and [`UnaryOp`].

mod arithmetic;
pub mod matmul;
mod tensor_ops;
pub mod traits;

pub use arithmetic::{BinaryOp, UnaryOp};
pub use matmul::{MatmulStrategy, matmul};
pub use tensor_ops::TensorOps;
pub use traits::{
    ActivationOps, BinaryOps, CompareOps, ConditionalOps, IndexingOps, LinalgOps, MatmulOps,
    ReduceOps, ScalarOps, ShapeOps, TypeConversionOps, UnaryOps,
};
