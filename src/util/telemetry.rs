//! Tracing bootstrap (§10.1 "Logging").

/// Initialize tracing. Installs a default env-based subscriber if none is
/// set yet; `verbose` raises the default level when `RUST_LOG` is unset.
pub fn init_tracing(verbose: bool) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
