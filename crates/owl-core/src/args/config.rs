//! Configuration builder and the resolved, immutable configuration

use crate::logging::OPERATOR_TARGET;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Default progress-report cadence, in iterations
pub const DEFAULT_LOG_STEP: u64 = 20_000;

/// Default checkpoint interval, as a multiple of the log step
pub const SAVE_STEP_FACTOR: u64 = 500;

/// Default verification interval, as a multiple of the log step
pub const CHECK_STEP_FACTOR: u64 = 10;

/// Mutable accumulator filled in while tokens are parsed
///
/// Only [`ConfigBuilder::finish`] produces a [`ResolvedConfig`], so nothing
/// outside this module can observe a configuration that has not been
/// normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBuilder {
    compiler_options: String,
    user_tag: String,
    log_step: u64,
    save_step: Option<u64>,
    check_step: Option<u64>,
    device: Option<usize>,
    time_kernels: bool,
    self_test: bool,
    legacy_kernels: bool,
    supersafe: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            compiler_options: String::new(),
            user_tag: String::new(),
            log_step: DEFAULT_LOG_STEP,
            save_step: None,
            check_step: None,
            device: None,
            time_kernels: false,
            self_test: false,
            legacy_kernels: false,
            supersafe: false,
        }
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log step as parsed so far (used by the help text defaults)
    pub fn current_log_step(&self) -> u64 {
        self.log_step
    }

    pub fn log_step(&mut self, n: u64) -> &mut Self {
        self.log_step = n;
        self
    }

    pub fn save_step(&mut self, n: u64) -> &mut Self {
        self.save_step = Some(n);
        self
    }

    pub fn check_step(&mut self, n: u64) -> &mut Self {
        self.check_step = Some(n);
        self
    }

    pub fn user_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.user_tag = tag.into();
        self
    }

    pub fn compiler_options(&mut self, options: impl Into<String>) -> &mut Self {
        self.compiler_options = options.into();
        self
    }

    pub fn device(&mut self, index: usize) -> &mut Self {
        self.device = Some(index);
        self
    }

    pub fn time_kernels(&mut self) -> &mut Self {
        self.time_kernels = true;
        self
    }

    pub fn self_test(&mut self) -> &mut Self {
        self.self_test = true;
        self
    }

    pub fn legacy_kernels(&mut self) -> &mut Self {
        self.legacy_kernels = true;
        self
    }

    pub fn supersafe(&mut self) -> &mut Self {
        self.supersafe = true;
        self
    }

    /// Derive, clamp, and align the dependent intervals
    ///
    /// Unset intervals default to a multiple of the log step. Explicit ones
    /// are raised to at least the log step and then rounded down to a
    /// multiple of it. Kernel timing is dropped when the log step is exactly
    /// one; that is the only adjustment reported to the log.
    pub fn finish(self) -> ResolvedConfig {
        let log_step = self.log_step;
        debug_assert!(log_step > 0);

        let save_step = align(self.save_step.unwrap_or(SAVE_STEP_FACTOR * log_step), log_step);
        let check_step = align(self.check_step.unwrap_or(CHECK_STEP_FACTOR * log_step), log_step);

        let mut time_kernels = self.time_kernels;
        if time_kernels && log_step == 1 {
            info!(target: OPERATOR_TARGET, "Ignoring time kernels because logStep == 1");
            time_kernels = false;
        }

        ResolvedConfig {
            compiler_options: self.compiler_options,
            user_tag: self.user_tag,
            log_step,
            save_step,
            check_step,
            device: self.device,
            time_kernels,
            self_test: self.self_test,
            legacy_kernels: self.legacy_kernels,
            supersafe: self.supersafe,
        }
    }
}

fn align(step: u64, log_step: u64) -> u64 {
    let step = step.max(log_step);
    step - step % log_step
}

/// Fully resolved launcher configuration
///
/// Invariants: `log_step > 0`, and both `save_step` and `check_step` are
/// positive multiples of `log_step`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    compiler_options: String,
    user_tag: String,
    log_step: u64,
    save_step: u64,
    check_step: u64,
    device: Option<usize>,
    time_kernels: bool,
    self_test: bool,
    legacy_kernels: bool,
    supersafe: bool,
}

impl ResolvedConfig {
    /// Options passed through to the kernel compiler
    pub fn compiler_options(&self) -> &str {
        &self.compiler_options
    }

    /// Tag prepended to result lines
    pub fn user_tag(&self) -> &str {
        &self.user_tag
    }

    pub fn log_step(&self) -> u64 {
        self.log_step
    }

    pub fn save_step(&self) -> u64 {
        self.save_step
    }

    pub fn check_step(&self) -> u64 {
        self.check_step
    }

    /// Selected device, `None` when the default device should be used
    pub fn device(&self) -> Option<usize> {
        self.device
    }

    /// Selected device with `-1` standing for "unspecified"
    pub fn device_index(&self) -> i64 {
        self.device.map_or(-1, |d| d as i64)
    }

    pub fn time_kernels(&self) -> bool {
        self.time_kernels
    }

    pub fn self_test(&self) -> bool {
        self.self_test
    }

    pub fn legacy_kernels(&self) -> bool {
        self.legacy_kernels
    }

    pub fn supersafe(&self) -> bool {
        self.supersafe
    }

    /// Command tokens that reproduce this configuration
    ///
    /// Carries the same flags as the summary line, in the same order. The
    /// compiler options are a single token, without shell quoting.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-logstep".to_string(),
            self.log_step.to_string(),
            "-savestep".to_string(),
            self.save_step.to_string(),
            "-checkstep".to_string(),
            self.check_step.to_string(),
        ];
        if !self.user_tag.is_empty() {
            args.push("-uid".to_string());
            args.push(self.user_tag.clone());
        }
        if self.supersafe {
            args.push("-supersafe".to_string());
        }
        if !self.compiler_options.is_empty() {
            args.push("-cl".to_string());
            args.push(self.compiler_options.clone());
        }
        if self.self_test {
            args.push("-selftest".to_string());
        }
        if self.time_kernels {
            args.push("-time".to_string());
            args.push("kernels".to_string());
        }
        if self.legacy_kernels {
            args.push("-legacy".to_string());
        }
        args
    }
}

impl fmt::Display for ResolvedConfig {
    /// `Config: -logstep N -savestep N -checkstep N` followed by the
    /// non-default options
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config: -logstep {} -savestep {} -checkstep {}",
            self.log_step, self.save_step, self.check_step
        )?;
        if !self.user_tag.is_empty() {
            write!(f, " -uid {}", self.user_tag)?;
        }
        if self.supersafe {
            f.write_str(" -supersafe")?;
        }
        if !self.compiler_options.is_empty() {
            write!(f, " -cl \"{}\"", self.compiler_options)?;
        }
        if self.self_test {
            f.write_str(" -selftest")?;
        }
        if self.time_kernels {
            f.write_str(" -time kernels")?;
        }
        if self.legacy_kernels {
            f.write_str(" -legacy")?;
        }
        Ok(())
    }
}
