//! Indexing operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Indexing operations
pub trait IndexingOps<R: Runtime> {
    /// Embed `src` into a copy of `dst` at `dst.slice(dim, start, end, step)`
    ///
    /// Returns a freshly allocated tensor; `dst` is not modified. `src` must
    /// have the shape of the selected slice.
    fn slice_scatter(
        &self,
        dst: &Tensor<R>,
        src: &Tensor<R>,
        dim: isize,
        start: isize,
        end: isize,
        step: isize,
    ) -> Result<Tensor<R>>;
}
