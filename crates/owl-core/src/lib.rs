//! Core configuration resolution for owl, a GPU Lucas-Lehmer launcher
//!
//! This crate turns the raw command tokens of an `owl` invocation into a
//! validated [`ResolvedConfig`], checked against the compute devices that are
//! actually present. Nothing here runs GPU work: it only decides how the
//! launcher should run.
//!
//! The main entry point is [`args::resolve`], which returns a [`Resolution`]:
//! either a fully normalized configuration or a stop signal (help shown, or a
//! diagnostic already logged).

pub mod args;
pub mod device;
pub mod home;
pub mod logging;
pub mod settings;

pub use args::{ArgsError, Resolution, ResolvedConfig, StopReason, resolve};
pub use device::{DeviceEnumerator, DeviceError};
