//! Reverse-mode gradient formulas
//!
//! Every formula takes the values an operation captured during its forward
//! pass plus the upstream gradient(s), and returns the vector-Jacobian
//! product for each differentiable input. Formulas are pure: they only call
//! the runtime client's operations and allocate fresh results.
//!
//! Conventions shared by the catalog:
//!
//! - An undefined gradient is `None`. Formulas that accumulate substitute a
//!   zero tensor of the right shape.
//! - Multi-input formulas take an output mask `[bool; N]` and return
//!   `[Option<Tensor<R>>; N]`; unmasked slots are `None` and cost nothing.
//! - Gradients of broadcast inputs are summed back to the input's shape with
//!   [`crate::dims::reduce_to_shape`].
//!
//! Each formula also has a [`GradFn`] node that captures its forward values
//! once and can be invoked later.

mod grad_fn;

pub mod ops;

pub use grad_fn::GradFn;
pub(crate) use grad_fn::single_grad;
pub use ops::*;
