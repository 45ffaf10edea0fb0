//! Logging setup using tracing.
//!
//! Logs go to stderr so stdout stays clean for command output. `RUST_LOG`
//! overrides the verbosity flags.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for a `-v` count.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "info,adlc=debug,adlc_core=debug,adlc_ldap=debug",
        _ => "trace",
    }
}

/// Initialize the tracing subscriber.
///
/// `json` switches to one JSON object per event for log shippers.
pub fn init_logging(verbosity: u8, json: bool) {
    let filter = default_filter(verbosity);
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(filter_layer);

    let result = if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .flatten_event(true),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Warning: failed to initialize logging: {e}");
    }
}
