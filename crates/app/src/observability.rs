//! Logging subscriber initialisation.

use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("failed to initialise tracing subscriber: {0}")]
    TracingSubscriber(#[from] TryInitError),
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for
/// command output.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), ObservabilityError> {
    match config.log_format {
        LogFormat::Compact => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(std::io::stderr),
        ),
        LogFormat::Json => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(std::io::stderr),
        ),
    }
}

/// `--log-level` wins over `RUST_LOG`; clap already falls back to the
/// environment when the flag is absent.
fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::new(format!("{},sqlx=warn", config.log_level))
}

fn init_with_layer<L>(config: &LoggingConfig, fmt_layer: L) -> Result<(), ObservabilityError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(config))
        .try_init()?;

    Ok(())
}
