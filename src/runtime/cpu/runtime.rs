//! CPU runtime implementation

use super::client::CpuClient;
use super::device::CpuDevice;
use crate::runtime::Runtime;

/// CPU compute runtime
///
/// This is the default runtime that works on any platform. Elements live in
/// host memory and every operation runs synchronously on the calling thread
/// (batched matmul fans out over the rayon pool when the `rayon` feature is
/// enabled).
#[derive(Clone, Debug, Default)]
pub struct CpuRuntime;

impl Runtime for CpuRuntime {
    type Device = CpuDevice;
    type Client = CpuClient;

    fn name() -> &'static str {
        "cpu"
    }

    fn default_device() -> Self::Device {
        CpuDevice::new()
    }

    fn default_client(device: &Self::Device) -> Self::Client {
        CpuClient::new(device.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Device, RuntimeClient};

    #[test]
    fn test_default_client_uses_device() {
        let device = CpuRuntime::default_device();
        let client = CpuRuntime::default_client(&device);
        assert!(client.device().is_same(&device));
        assert!(!device.is_accelerator());
        assert_eq!(CpuRuntime::name(), "cpu");
    }
}
