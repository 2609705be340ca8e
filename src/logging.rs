use tracing_subscriber::EnvFilter;

use crate::error::{MapError, Result};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the crate logs at `info`, or `debug`
/// when `verbose` is on. Output goes to stderr so exported JSON can be piped.
pub fn init(verbose: bool) -> Result<()> {
    let default_directive = if verbose {
        "carpool_map=debug"
    } else {
        "carpool_map=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| MapError::Logging(err.to_string()))
}
