//! Log subscriber setup

use clap::ValueEnum;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
pub enum LogStyle {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Install the global subscriber
///
/// `filter` takes `RUST_LOG` syntax; without it `RUST_LOG` is read, falling
/// back to `info`.
pub fn init(style: LogStyle, filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = fmt().with_env_filter(filter).with_target(true);
    let result = match style {
        LogStyle::Text => builder.try_init(),
        LogStyle::Json => builder.json().try_init(),
    };

    if let Err(e) = result {
        tracing::warn!(error = %e, "tracing init failed");
    }
}
