//! Fixed device list backend

use super::{DeviceEnumerator, DeviceError, DeviceHandle};

/// Device list known up front
///
/// Used by tests and by the `OWL_FAKE_DEVICES` override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticDevices {
    names: Vec<String>,
}

impl StaticDevices {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl DeviceEnumerator for StaticDevices {
    fn enumerate(&self, max: usize) -> Result<Vec<DeviceHandle>, DeviceError> {
        Ok(self
            .names
            .iter()
            .take(max)
            .enumerate()
            .map(|(ordinal, name)| DeviceHandle {
                ordinal,
                name: name.clone(),
                memory_total_mib: None,
            })
            .collect())
    }

    fn count(&self) -> Result<usize, DeviceError> {
        Ok(self.names.len())
    }
}
