//! Tensor types
//!
//! This module provides the `Tensor` handle: an n-dimensional view over
//! reference-counted storage owned by a runtime.

mod core;
mod layout;
mod storage;

pub use core::Tensor;
pub use layout::{Layout, Shape, Strides, normalize_slice};
pub use storage::{Storage, StorageFormat};
