//! Runtime backends for tensor computation
//!
//! This module defines the `Runtime` trait: the capability seam between the
//! backward formulas and whatever engine executes the primitive kernels.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a specific compute unit)
//! └── Client (dispatches operations; implements the `ops` traits)
//! ```
//!
//! The CPU runtime is a reference implementation over host memory. It is
//! what the gradient catalog is tested against.

pub mod shape_ops;
mod traits;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use traits::{Device, Runtime, RuntimeClient};
