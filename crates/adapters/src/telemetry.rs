//! Tracing subscriber setup.
//!
//! The engine only emits `tracing` events; embedders decide whether to install
//! a subscriber. [`init_tracing`] installs the fmt subscriber described by
//! [`LoggingConfig`], with `RUST_LOG` taking precedence over the configured
//! level.

use snapdiff_config::{LogFormat, LogLevel, LoggingConfig};
use snapdiff_shared::{ErrorCode, ErrorEnvelope, Result};
use tracing_subscriber::EnvFilter;

/// Build the event filter from optional `RUST_LOG` directives.
///
/// Blank directives count as unset and fall back to `level`.
pub fn filter_from_directives(directives: Option<&str>, level: LogLevel) -> Result<EnvFilter> {
    match directives.map(str::trim).filter(|value| !value.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("telemetry", "invalid_log_filter"),
                format!("invalid log filter directives: {error}"),
            )
            .with_metadata("directives", directives)
        }),
        None => Ok(EnvFilter::new(level.as_str())),
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_from_directives(directives.as_deref(), config.level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    Ok(installed.is_ok())
}
