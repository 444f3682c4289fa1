//! Operation trait implementations for the CPU runtime
//!
//! This module contains the operation trait implementations that dispatch to
//! the helpers.

use super::helpers::{
    SoftmaxKind, TriangleKind, binary_op_impl, bmm_impl, cast_impl, cat_impl, dot_impl,
    eq_scalar_impl, fill_diagonal_impl, mm_impl, mv_impl, roll_impl, scalar_op_impl,
    slice_scatter_impl, softmax_impl, sum_impl, triangle_impl, unary_op_impl, where_cond_impl,
};
use super::{CpuClient, CpuRuntime};
use crate::dtype::DType;
use crate::error::Result;
use crate::ops::{
    ActivationOps, BinaryOp, BinaryOps, CompareOps, ConditionalOps, IndexingOps, LinalgOps,
    MatmulOps, ReduceOps, ScalarOps, ShapeOps, TypeConversionOps, UnaryOp, UnaryOps,
};
use crate::tensor::Tensor;

// ============================================================================
// Element-wise
// ============================================================================

impl BinaryOps<CpuRuntime> for CpuClient {
    fn add(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_op_impl(self, BinaryOp::Add, a, b, "add")
    }

    fn sub(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_op_impl(self, BinaryOp::Sub, a, b, "sub")
    }

    fn mul(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_op_impl(self, BinaryOp::Mul, a, b, "mul")
    }

    fn div(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_op_impl(self, BinaryOp::Div, a, b, "div")
    }

    fn pow(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_op_impl(self, BinaryOp::Pow, a, b, "pow")
    }

    fn atan2(&self, y: &Tensor<CpuRuntime>, x: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_op_impl(self, BinaryOp::Atan2, y, x, "atan2")
    }
}

impl ScalarOps<CpuRuntime> for CpuClient {
    fn add_scalar(&self, a: &Tensor<CpuRuntime>, scalar: f64) -> Result<Tensor<CpuRuntime>> {
        scalar_op_impl(self, BinaryOp::Add, a, scalar, "add_scalar")
    }

    fn mul_scalar(&self, a: &Tensor<CpuRuntime>, scalar: f64) -> Result<Tensor<CpuRuntime>> {
        scalar_op_impl(self, BinaryOp::Mul, a, scalar, "mul_scalar")
    }

    fn pow_scalar(&self, a: &Tensor<CpuRuntime>, scalar: f64) -> Result<Tensor<CpuRuntime>> {
        scalar_op_impl(self, BinaryOp::Pow, a, scalar, "pow_scalar")
    }
}

impl UnaryOps<CpuRuntime> for CpuClient {
    fn neg(&self, a: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        unary_op_impl(self, UnaryOp::Neg, a, "neg")
    }

    fn log(&self, a: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        unary_op_impl(self, UnaryOp::Log, a, "log")
    }

    fn exp(&self, a: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        unary_op_impl(self, UnaryOp::Exp, a, "exp")
    }

    fn reciprocal(&self, a: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        unary_op_impl(self, UnaryOp::Recip, a, "reciprocal")
    }

    fn square(&self, a: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        unary_op_impl(self, UnaryOp::Square, a, "square")
    }
}

impl CompareOps<CpuRuntime> for CpuClient {
    fn eq_scalar(&self, a: &Tensor<CpuRuntime>, scalar: f64) -> Result<Tensor<CpuRuntime>> {
        eq_scalar_impl(self, a, scalar)
    }
}

impl ConditionalOps<CpuRuntime> for CpuClient {
    fn where_cond(
        &self,
        cond: &Tensor<CpuRuntime>,
        x: &Tensor<CpuRuntime>,
        y: &Tensor<CpuRuntime>,
    ) -> Result<Tensor<CpuRuntime>> {
        where_cond_impl(self, cond, x, y)
    }
}

impl TypeConversionOps<CpuRuntime> for CpuClient {
    fn cast(&self, a: &Tensor<CpuRuntime>, dtype: DType) -> Result<Tensor<CpuRuntime>> {
        cast_impl(self, a, dtype)
    }
}

// ============================================================================
// Matmul / Reduce
// ============================================================================

impl MatmulOps<CpuRuntime> for CpuClient {
    fn dot(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        dot_impl(self, a, b)
    }

    fn mv(&self, a: &Tensor<CpuRuntime>, v: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        mv_impl(self, a, v)
    }

    fn mm(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        mm_impl(self, a, b)
    }

    fn bmm(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        bmm_impl(self, a, b)
    }
}

impl ReduceOps<CpuRuntime> for CpuClient {
    fn sum(
        &self,
        a: &Tensor<CpuRuntime>,
        dims: &[usize],
        keepdim: bool,
    ) -> Result<Tensor<CpuRuntime>> {
        sum_impl(self, a, dims, keepdim)
    }
}

// ============================================================================
// Shape / Indexing / Linalg
// ============================================================================

impl ShapeOps<CpuRuntime> for CpuClient {
    fn cat(&self, tensors: &[&Tensor<CpuRuntime>], dim: isize) -> Result<Tensor<CpuRuntime>> {
        cat_impl(self, tensors, dim)
    }

    fn roll(
        &self,
        a: &Tensor<CpuRuntime>,
        shifts: &[i64],
        dims: &[isize],
    ) -> Result<Tensor<CpuRuntime>> {
        roll_impl(self, a, shifts, dims)
    }
}

impl IndexingOps<CpuRuntime> for CpuClient {
    fn slice_scatter(
        &self,
        dst: &Tensor<CpuRuntime>,
        src: &Tensor<CpuRuntime>,
        dim: isize,
        start: isize,
        end: isize,
        step: isize,
    ) -> Result<Tensor<CpuRuntime>> {
        slice_scatter_impl(self, dst, src, dim, start, end, step)
    }
}

impl LinalgOps<CpuRuntime> for CpuClient {
    fn triu(&self, a: &Tensor<CpuRuntime>, diagonal: i64) -> Result<Tensor<CpuRuntime>> {
        triangle_impl(self, a, TriangleKind::Upper, diagonal)
    }

    fn tril(&self, a: &Tensor<CpuRuntime>, diagonal: i64) -> Result<Tensor<CpuRuntime>> {
        triangle_impl(self, a, TriangleKind::Lower, diagonal)
    }

    fn fill_diagonal(&self, a: &Tensor<CpuRuntime>, value: f64) -> Result<Tensor<CpuRuntime>> {
        fill_diagonal_impl(self, a, value)
    }
}

// ============================================================================
// Activations
// ============================================================================

impl ActivationOps<CpuRuntime> for CpuClient {
    fn softmax(
        &self,
        a: &Tensor<CpuRuntime>,
        dim: isize,
        half_to_float: bool,
    ) -> Result<Tensor<CpuRuntime>> {
        softmax_impl(self, a, dim, half_to_float, SoftmaxKind::Softmax)
    }

    fn log_softmax(
        &self,
        a: &Tensor<CpuRuntime>,
        dim: isize,
        half_to_float: bool,
    ) -> Result<Tensor<CpuRuntime>> {
        softmax_impl(self, a, dim, half_to_float, SoftmaxKind::LogSoftmax)
    }
}
