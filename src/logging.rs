use tracing_subscriber::EnvFilter;

/// Sends diagnostics to stderr. `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
