//! Logging initialization.

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "chat_core=debug,chat_memory_storage=info,info";

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`, falling back
/// to [`DEFAULT_LOG_FILTER`].
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LOG_FILTER);
}

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`, falling back
/// to `default_filter`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging_with_default(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
