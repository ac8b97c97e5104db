//! Compute device enumeration
//!
//! The resolver only needs three things from the hardware layer: how many
//! devices there are, an ordered bounded list of them, and a short
//! description of each. [`DeviceEnumerator`] is that contract; the backends
//! here implement it over a fixed list and over `nvidia-smi`.

mod fixed;
mod nvidia;

pub use fixed::StaticDevices;
pub use nvidia::{GpuInfo, NvidiaSmi};

use thiserror::Error;

/// Device query errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No compute platform/driver is installed
    #[error("no compute platform available: {0}")]
    NoPlatform(String),

    /// The platform is present but the query failed
    #[error("device query failed: {0}")]
    Query(String),
}

/// Opaque reference to one enumerated device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    /// Position in the enumeration order, starting at 0
    pub ordinal: usize,
    /// Device name as reported by the backend
    pub name: String,
    /// Total device memory, when the backend reports it
    pub memory_total_mib: Option<u64>,
}

/// Device enumeration collaborator
///
/// Implementations must report devices in a stable order for the lifetime of
/// the process. An empty list is a valid answer.
pub trait DeviceEnumerator {
    /// Up to `max` devices, in enumeration order
    fn enumerate(&self, max: usize) -> Result<Vec<DeviceHandle>, DeviceError>;

    /// Short human-readable description of a device
    fn describe(&self, handle: &DeviceHandle) -> String {
        match handle.memory_total_mib {
            Some(mib) => format!("{} ({mib} MiB)", handle.name),
            None => handle.name.clone(),
        }
    }

    /// Number of available devices
    fn count(&self) -> Result<usize, DeviceError>;
}

/// Device backend selected by launcher settings
#[derive(Debug, Clone)]
pub enum DeviceBackend {
    /// Fixed device list (testing, or machines without a GPU tool)
    Static(StaticDevices),
    /// NVIDIA devices reported by `nvidia-smi`
    NvidiaSmi(NvidiaSmi),
}

impl DeviceEnumerator for DeviceBackend {
    fn enumerate(&self, max: usize) -> Result<Vec<DeviceHandle>, DeviceError> {
        match self {
            DeviceBackend::Static(devices) => devices.enumerate(max),
            DeviceBackend::NvidiaSmi(devices) => devices.enumerate(max),
        }
    }

    fn describe(&self, handle: &DeviceHandle) -> String {
        match self {
            DeviceBackend::Static(devices) => devices.describe(handle),
            DeviceBackend::NvidiaSmi(devices) => devices.describe(handle),
        }
    }

    fn count(&self) -> Result<usize, DeviceError> {
        match self {
            DeviceBackend::Static(devices) => devices.count(),
            DeviceBackend::NvidiaSmi(devices) => devices.count(),
        }
    }
}
