//! Shared logging initialization for the owl binary.

use crate::settings::LoggingSettings;
use std::sync::OnceLock;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// Target for output the operator asked for: help, the configuration
/// summary and normalization notices.
///
/// Events on this target pass at `info` even when the configured level is
/// quieter, so `OWL_LOG=warn` still shows help.
pub const OPERATOR_TARGET: &str = "owl_core::operator";

static INIT: OnceLock<()> = OnceLock::new();

fn parse_level(raw: &str) -> tracing::Level {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

/// Initialize process-level tracing output at the configured level.
///
/// Only the first call installs the subscriber; later calls are no-ops.
/// Output goes to stdout so help and the configuration summary land in the
/// same stream as the rest of the run log.
pub fn init(settings: &LoggingSettings) {
    if INIT.get().is_some() {
        return;
    }
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stdout),
        )
        .with(filter_for(parse_level(&settings.level)))
        .try_init();
    let _ = INIT.set(());
}

fn filter_for(level: tracing::Level) -> Targets {
    Targets::new()
        .with_default(level)
        .with_target(OPERATOR_TARGET, level.max(tracing::Level::INFO))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), tracing::Level::DEBUG);
        assert_eq!(parse_level(" warn "), tracing::Level::WARN);
        assert_eq!(parse_level("trace"), tracing::Level::TRACE);
        assert_eq!(parse_level("error"), tracing::Level::ERROR);
        assert_eq!(parse_level("loud"), tracing::Level::INFO);
    }

    #[test]
    fn test_operator_target_survives_quiet_level() {
        let filter = filter_for(tracing::Level::WARN);
        assert!(filter.would_enable(OPERATOR_TARGET, &tracing::Level::INFO));
        assert!(!filter.would_enable(OPERATOR_TARGET, &tracing::Level::DEBUG));
        assert!(!filter.would_enable("owl_core::args", &tracing::Level::INFO));
        assert!(filter.would_enable("owl_core::args", &tracing::Level::WARN));
    }

    #[test]
    fn test_operator_target_follows_verbose_level() {
        let filter = filter_for(tracing::Level::DEBUG);
        assert!(filter.would_enable(OPERATOR_TARGET, &tracing::Level::DEBUG));
        assert!(filter.would_enable("owl_core::args", &tracing::Level::DEBUG));
    }
}
