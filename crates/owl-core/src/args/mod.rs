//! Command-line resolution
//!
//! Turns the launcher's command tokens into a [`ResolvedConfig`]:
//! 1. Tokens are consumed left to right through a [`TokenCursor`]
//! 2. Values accumulate in a [`ConfigBuilder`]
//! 3. The builder derives, clamps and aligns the intervals
//! 4. The summary line is logged and the configuration returned

mod config;
mod cursor;
mod error;
pub mod help;
mod resolve;

pub use config::{
    CHECK_STEP_FACTOR, ConfigBuilder, DEFAULT_LOG_STEP, ResolvedConfig, SAVE_STEP_FACTOR,
};
pub use cursor::{MAX_STEP, TokenCursor};
pub use error::ArgsError;
pub use resolve::{Resolution, StopReason, resolve};
