//! Process-wide tracing subscriber setup.

/// Initializes the tracing subscriber for an embedding process.
///
/// Verbosity is controlled through `RUST_LOG`, e.g. `RUST_LOG=plughost=debug`
/// to see enabled-flag resolution for every plugin.
///
/// Calling it twice is harmless; the second call leaves the installed
/// subscriber in place.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
