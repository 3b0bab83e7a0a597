use crate::config::TelemetryConfig;
use tracing::debug;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Transport crates held at `warn` so request logs stay readable at `debug`.
const QUIET_TARGETS: &[&str] = &["hyper", "mio"];

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("log filter '{value}' is not a valid tracing directive")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// `APP_LOG_LEVEL` expanded with caps for the quiet targets it does not mention itself.
pub fn directives(log_level: &str) -> String {
    let level = log_level.trim();
    let mut parts = vec![if level.is_empty() { "info" } else { level }.to_string()];
    parts.extend(
        QUIET_TARGETS
            .iter()
            .filter(|target| !level.contains(&format!("{target}=")))
            .map(|target| format!("{target}=warn")),
    );
    parts.join(",")
}

/// A non-blank `RUST_LOG` replaces the configured level entirely.
pub fn build_filter(
    config: &TelemetryConfig,
    rust_log: Option<&str>,
) -> Result<EnvFilter, TelemetryError> {
    let raw = match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(explicit) => explicit.to_string(),
        None => directives(&config.log_level),
    };
    EnvFilter::try_new(&raw).map_err(|source| TelemetryError::Filter { value: raw, source })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(config, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(config.ansi)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)?;

    debug!(
        level = %config.log_level,
        ansi = config.ansi,
        rust_log = rust_log.is_some(),
        "telemetry installed"
    );
    Ok(())
}
