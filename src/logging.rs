use std::io;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `debug` turns on the clustering and
/// matrix targets at debug level.
pub fn configure_logging(debug: bool) {
    let default_filter = if debug {
        "info,cluster=debug,matrix=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_log = fmt::layer().with_writer(io::stderr).with_target(true);

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_log)
        .try_init();
}
