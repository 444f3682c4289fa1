//! Backward formulas and their gradient nodes
//!
//! Each formula is a free function taking a client, the upstream
//! gradient(s) and the captured forward values. Most also come with a node
//! type implementing `GradFn` that captures those values up front.
//!
//! # Structure
//!
//! - `arithmetic`: pow (scalar and tensor exponents), atan2
//! - `matmul`: mm (with alpha) and rank-polymorphic matmul
//! - `reduce`: sum
//! - `shape`: split, split_with_sizes, cat, slice, roll
//! - `linalg`: symmetric eigendecomposition
//! - `activation`: softmax / log_softmax with a requested dtype

mod activation;
mod arithmetic;
mod linalg;
mod matmul;
mod reduce;
mod shape;

pub use activation::*;
pub use arithmetic::*;
pub use linalg::*;
pub use matmul::*;
pub use reduce::*;
pub use shape::*;
