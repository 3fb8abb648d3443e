use tracing_subscriber::EnvFilter;

/// Applies when `RUST_LOG` is unset or unparseable; covers both binaries.
const DEFAULT_DIRECTIVES: &str = "outage_ingestion=info,installed_capacity=info";

fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Logs go to stderr so that a table written to stdout stays clean.
pub fn init_tracing() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
