//! High-level TensorOps trait
//!
//! Aggregates all operation traits into a single convenience trait.

use crate::runtime::Runtime;

use super::traits::{
    ActivationOps, BinaryOps, CompareOps, ConditionalOps, IndexingOps, LinalgOps, MatmulOps,
    ReduceOps, ScalarOps, ShapeOps, TypeConversionOps, UnaryOps,
};

/// Core tensor operations trait
///
/// This trait aggregates all operation traits into a single convenience trait.
/// It is implemented by `RuntimeClient` types, and is the bound every backward
/// formula places on `R::Client`.
///
/// # Example
///
/// ```ignore
/// let device = CpuDevice::new();
/// let client = CpuRuntime::default_client(&device);
///
/// let a = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
/// let b = Tensor::<CpuRuntime>::from_slice(&[5.0f32, 6.0, 7.0, 8.0], &[2, 2], &device);
///
/// let c = client.mm(&a, &b)?;
/// ```
pub trait TensorOps<R: Runtime>:
    TypeConversionOps<R>
    + ConditionalOps<R>
    + MatmulOps<R>
    + ActivationOps<R>
    + ReduceOps<R>
    + IndexingOps<R>
    + LinalgOps<R>
    + ShapeOps<R>
    + UnaryOps<R>
    + BinaryOps<R>
    + ScalarOps<R>
    + CompareOps<R>
{
}

impl<R: Runtime, C> TensorOps<R> for C where
    C: TypeConversionOps<R>
        + ConditionalOps<R>
        + MatmulOps<R>
        + ActivationOps<R>
        + ReduceOps<R>
        + IndexingOps<R>
        + LinalgOps<R>
        + ShapeOps<R>
        + UnaryOps<R>
        + BinaryOps<R>
        + ScalarOps<R>
        + CompareOps<R>
{
}
