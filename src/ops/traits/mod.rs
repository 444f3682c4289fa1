//! Operation traits for tensor operations.
//!
//! This module contains trait definitions for the primitive operations the
//! backward formulas consume. Implementations live in the backend modules.

mod activation;
mod binary;
mod compare;
mod conditional;
mod indexing;
mod linalg;
mod matmul;
mod reduce;
mod scalar;
mod shape;
mod type_conversion;
mod unary;

pub use activation::ActivationOps;
pub use binary::BinaryOps;
pub use compare::CompareOps;
pub use conditional::ConditionalOps;
pub use indexing::IndexingOps;
pub use linalg::LinalgOps;
pub use matmul::MatmulOps;
pub use reduce::ReduceOps;
pub use scalar::ScalarOps;
pub use shape::ShapeOps;
pub use type_conversion::TypeConversionOps;
pub use unary::UnaryOps;
