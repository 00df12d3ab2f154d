use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Initializes the global tracing subscriber: an `EnvFilter` seeded from `log_level` (still
/// overridable via `RUST_LOG`) feeding either a human-readable or a JSON fmt layer.
///
/// Call once, near the top of `main`.
pub fn init_tracing(service_name: &str, log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(true))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true))
            .init(),
    }

    tracing::info!(service = service_name, "tracing initialised");
}
