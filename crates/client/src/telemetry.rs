use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this more than once
/// is harmless; later calls leave the first subscriber in place.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let installed = fmt::SubscriberBuilder::default()
        .with_env_filter(filter)
        .compact()
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level, "tracing initialized");
    }
}
