//! Console logging setup driven by [`ServerConfig`].

use trellis_core::{LogLevel, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when the configuration names no console levels.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global `tracing` subscriber for `config`.
///
/// `RUST_LOG` wins when set. Otherwise the filter is derived from
/// `consoleLogLevels`, and `colorfulLogs` controls ANSI output.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(config: &ServerConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(config.colorful_logs.unwrap_or(true)))
        .try_init()
        .is_ok()
}

/// The `EnvFilter` directive matching the configured console levels.
///
/// `tracing` has no notice level, so `notice` maps to `info`. An empty level
/// list turns console output off.
pub fn filter_directive(config: &ServerConfig) -> &'static str {
    let Some(levels) = &config.console_log_levels else {
        return DEFAULT_DIRECTIVE;
    };

    match levels.most_verbose() {
        Some(LogLevel::Debug) => "debug",
        Some(LogLevel::Info) | Some(LogLevel::Notice) => "info",
        Some(LogLevel::Warn) => "warn",
        Some(LogLevel::Error) => "error",
        None => "off",
    }
}
