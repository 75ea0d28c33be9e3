//! Structured logging.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects debug output for
/// the gateway and its HTTP middleware.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "gateway=debug,tower_http=debug"
    } else {
        "gateway=info,tower_http=info"
    };

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
