//! Token-to-configuration resolution

use super::config::{ConfigBuilder, ResolvedConfig};
use super::cursor::TokenCursor;
use super::error::ArgsError;
use super::help;
use crate::device::DeviceEnumerator;
use crate::logging::OPERATOR_TARGET;
use tracing::{debug, error, info};

/// Outcome of [`resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Every token was understood and the configuration is normalized
    Resolved(ResolvedConfig),
    /// The launcher must not start; the reason was already logged
    Stop(StopReason),
}

/// Why resolution stopped without a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `-h` / `--help` was requested and the help text was shown
    Help,
    /// A token was missing, malformed, out of range, or unknown
    Invalid(ArgsError),
}

impl Resolution {
    /// The resolved configuration, if there is one
    pub fn config(&self) -> Option<&ResolvedConfig> {
        match self {
            Resolution::Resolved(config) => Some(config),
            Resolution::Stop(_) => None,
        }
    }

    /// The error that stopped resolution, if any
    pub fn error(&self) -> Option<&ArgsError> {
        match self {
            Resolution::Stop(StopReason::Invalid(err)) => Some(err),
            _ => None,
        }
    }
}

enum Parsed {
    Complete(ConfigBuilder),
    Help { log_step: u64 },
}

/// Resolve command tokens (program name excluded) into a configuration
///
/// Tokens are consumed left to right and the first bad token stops the
/// pass. Help, diagnostics, the time-kernels notice and the final summary
/// line are all written to the `tracing` log.
///
/// `devices` is only queried for `-device` (count, once per call) and for
/// `-h` (bounded enumeration). Enumeration failures are errors only in
/// those two cases.
pub fn resolve<I, S, D>(tokens: I, devices: &D) -> Resolution
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    D: DeviceEnumerator + ?Sized,
{
    match parse(tokens, devices) {
        Ok(Parsed::Complete(builder)) => {
            let config = builder.finish();
            info!(target: OPERATOR_TARGET, "{config}");
            Resolution::Resolved(config)
        }
        Ok(Parsed::Help { log_step }) => {
            let listing = help::device_lines(devices);
            for line in help::render_lines(log_step, &listing) {
                info!(target: OPERATOR_TARGET, "{line}");
            }
            match listing {
                Ok(_) => Resolution::Stop(StopReason::Help),
                Err(e) => {
                    let err = ArgsError::from(e);
                    error!("{err}");
                    Resolution::Stop(StopReason::Invalid(err))
                }
            }
        }
        Err(err) => {
            error!("{err}");
            Resolution::Stop(StopReason::Invalid(err))
        }
    }
}

fn parse<I, S, D>(tokens: I, devices: &D) -> Result<Parsed, ArgsError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    D: DeviceEnumerator + ?Sized,
{
    let mut cursor = TokenCursor::new(tokens.into_iter().map(Into::<String>::into));
    let mut builder = ConfigBuilder::new();
    let mut device_count: Option<usize> = None;

    while let Some(flag) = cursor.next_flag() {
        debug!(token = %flag, "parsing argument");
        match flag.as_str() {
            "-h" | "--help" => {
                return Ok(Parsed::Help {
                    log_step: builder.current_log_step(),
                });
            }
            "-logstep" => {
                builder.log_step(cursor.count_for("-logstep")?);
            }
            "-savestep" => {
                builder.save_step(cursor.count_for("-savestep")?);
            }
            "-checkstep" => {
                builder.check_step(cursor.count_for("-checkstep")?);
            }
            "-uid" => {
                builder.user_tag(cursor.value_for("-uid", "userName/computerName")?);
            }
            "-supersafe" => {
                builder.supersafe();
            }
            "-cl" => {
                builder.compiler_options(
                    cursor.value_for("-cl", "options string to pass to CL compiler")?,
                );
            }
            "-selftest" => {
                builder.self_test();
            }
            "-time" => match cursor.next_flag().as_deref() {
                Some("kernels") => {
                    builder.time_kernels();
                }
                _ => return Err(ArgsError::InvalidTime),
            },
            "-legacy" => {
                builder.legacy_kernels();
            }
            "-device" => {
                let value = cursor.value_for("-device", "<N> argument")?;
                let index = match value.parse::<i64>() {
                    Ok(index) => index,
                    Err(_) => return Err(ArgsError::InvalidDeviceToken(value)),
                };
                let count = match device_count {
                    Some(count) => count,
                    None => {
                        let count = devices.count()?;
                        device_count = Some(count);
                        count
                    }
                };
                if index < 0 || index >= count as i64 {
                    return Err(ArgsError::DeviceOutOfRange {
                        index,
                        max: count as i64 - 1,
                    });
                }
                builder.device(index as usize);
            }
            _ => return Err(ArgsError::NotUnderstood(flag)),
        }
    }

    Ok(Parsed::Complete(builder))
}
