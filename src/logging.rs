//! Diagnostic logging for the CLI. Library code only emits `tracing` events.

use tracing_subscriber::EnvFilter;

/// Level directive used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "scribe=debug"
    } else {
        "warn"
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over `verbose`. Safe to call more than once.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
