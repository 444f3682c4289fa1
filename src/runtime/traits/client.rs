//! Trait for runtime clients that handle operation dispatch

use super::Runtime;

/// Trait for runtime clients that handle operation dispatch
///
/// Operation traits (`BinaryOps`, `MatmulOps`, ...) are implemented on the
/// client type, so a formula holding a client can call any primitive.
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// Synchronize: wait for all pending operations to complete
    fn synchronize(&self) {}
}
