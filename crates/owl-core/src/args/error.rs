//! Error types for argument resolution

use crate::device::DeviceError;
use thiserror::Error;

/// Argument parsing and validation errors
///
/// The `Display` text of each variant is the operator-facing diagnostic
/// written to the log when resolution stops.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgsError {
    /// A value-taking flag was the last token
    #[error("{flag} expects {expected}")]
    MissingValue {
        flag: &'static str,
        expected: &'static str,
    },

    /// An interval value that is not a positive integer
    #[error("invalid {flag} '{value}'")]
    InvalidCount { flag: &'static str, value: String },

    /// `-time` followed by anything other than `kernels`
    #[error("-time expects 'kernels'")]
    InvalidTime,

    /// `-device` followed by a non-integer token
    #[error("invalid -device '{0}'")]
    InvalidDeviceToken(String),

    /// `-device` index outside the enumerated device range
    #[error("invalid -device {index} (must be between [0, {max}])")]
    DeviceOutOfRange { index: i64, max: i64 },

    /// The device enumeration collaborator failed
    #[error("device enumeration failed: {0}")]
    DeviceQuery(#[from] DeviceError),

    /// Unknown token
    #[error("Argument '{0}' not understood")]
    NotUnderstood(String),
}
