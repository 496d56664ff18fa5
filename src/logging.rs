use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "codesmith=info";

/// Installs the global `tracing` subscriber, honoring `RUST_LOG` when set.
///
/// Calling this more than once is harmless; later calls keep the first
/// subscriber.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
