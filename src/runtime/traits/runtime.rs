//! Core trait for compute backends

/// A compute backend the gradient formulas can run on
///
/// Formulas are generic over `R: Runtime` and bound `R::Client:
/// TensorOps<R>`; they never see a concrete backend. Dispatch is static.
///
/// - `Device`: which compute unit a tensor lives on
/// - `Client`: dispatches the primitive operations for that device
///
/// # Example
///
/// ```ignore
/// let device = CpuRuntime::default_device();
/// let client = CpuRuntime::default_client(&device);
/// let g = pow_backward(&client, &grad, &x, 2.0)?;
/// ```
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device identifier type
    type Device: super::Device;

    /// Client for dispatching operations
    type Client: super::RuntimeClient<Self>;

    /// Human-readable name of this runtime
    fn name() -> &'static str;

    /// Get the default device
    fn default_device() -> Self::Device;

    /// Get a client bound to `device`
    fn default_client(device: &Self::Device) -> Self::Client;
}
