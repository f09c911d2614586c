use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs go to stderr so rendered views on stdout stay clean. `RUST_LOG`
/// overrides the default level.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "team_performance_dashboard=debug"
    } else {
        "team_performance_dashboard=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();
}
