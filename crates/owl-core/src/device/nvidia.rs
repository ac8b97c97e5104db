//! NVIDIA device enumeration through `nvidia-smi`

use super::{DeviceEnumerator, DeviceError, DeviceHandle};
use std::io::ErrorKind;
use std::process::Command;
use tracing::debug;

const NVIDIA_SMI: &str = "nvidia-smi";

/// One row of `nvidia-smi --query-gpu` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuInfo {
    pub index: u32,
    pub name: String,
    pub memory_total_mib: u64,
}

/// Backend that shells out to `nvidia-smi`
#[derive(Debug, Clone)]
pub struct NvidiaSmi {
    program: String,
}

impl Default for NvidiaSmi {
    fn default() -> Self {
        Self {
            program: NVIDIA_SMI.to_string(),
        }
    }
}

impl NvidiaSmi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable (a wrapper script, or a full path)
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run the query and parse every reported GPU
    pub fn query(&self) -> Result<Vec<GpuInfo>, DeviceError> {
        debug!(program = %self.program, "querying GPUs");
        let output = Command::new(&self.program)
            .args([
                "--query-gpu=index,name,memory.total",
                "--format=csv,noheader,nounits",
            ])
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    DeviceError::NoPlatform(format!("{} not found", self.program))
                }
                _ => DeviceError::Query(format!("failed to execute {}: {e}", self.program)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                return Err(DeviceError::Query(format!(
                    "{} returned non-zero exit status ({})",
                    self.program, output.status
                )));
            }
            return Err(DeviceError::Query(stderr));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|_| DeviceError::Query(format!("{} output was not UTF-8", self.program)))?;
        parse_query_output(&stdout)
    }
}

impl DeviceEnumerator for NvidiaSmi {
    fn enumerate(&self, max: usize) -> Result<Vec<DeviceHandle>, DeviceError> {
        Ok(self
            .query()?
            .into_iter()
            .take(max)
            .enumerate()
            .map(|(ordinal, gpu)| DeviceHandle {
                ordinal,
                name: gpu.name,
                memory_total_mib: Some(gpu.memory_total_mib),
            })
            .collect())
    }

    fn count(&self) -> Result<usize, DeviceError> {
        Ok(self.query()?.len())
    }
}

/// Parse `index, name, memory.total` CSV rows
///
/// GPU names may themselves contain commas, so the index is taken from the
/// first column, the memory from the last, and the name from what is left.
pub fn parse_query_output(raw: &str) -> Result<Vec<GpuInfo>, DeviceError> {
    let mut gpus = Vec::new();
    for (line_idx, raw_line) in raw.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let columns = line.split(',').map(str::trim).collect::<Vec<_>>();
        if columns.len() < 3 {
            return Err(DeviceError::Query(format!(
                "unexpected nvidia-smi output at line {}: '{line}'",
                line_idx + 1
            )));
        }

        let index = columns[0].parse::<u32>().map_err(|_| {
            DeviceError::Query(format!(
                "invalid GPU index '{}' at line {}",
                columns[0],
                line_idx + 1
            ))
        })?;
        let last = columns.len() - 1;
        let memory_total_mib = columns[last].parse::<u64>().map_err(|_| {
            DeviceError::Query(format!(
                "invalid GPU memory.total value '{}' at line {}",
                columns[last],
                line_idx + 1
            ))
        })?;
        let name = columns[1..last].join(", ");

        gpus.push(GpuInfo {
            index,
            name,
            memory_total_mib,
        });
    }
    Ok(gpus)
}
