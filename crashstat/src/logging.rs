//! Diagnostic logging to stderr.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks the level for
/// both crates (0 = warn, 1 = info, 2+ = debug).
pub fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "crashstat=warn,crashstatlib=warn",
        1 => "crashstat=info,crashstatlib=info",
        _ => "crashstat=debug,crashstatlib=debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let console_layer = fmt::layer()
        .with_target(true)
        .without_time()
        .with_writer(std::io::stderr);

    // a second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}
