//! Logging setup for the command-line tool.
//!
//! `RUST_LOG` takes precedence; otherwise the level comes from the
//! `-v`/`-q` flags. Output goes to stderr so stdout stays free for reports.

use tracing_subscriber::EnvFilter;

/// Filter directive for a verbosity offset (0 = info).
pub fn level_for(verbosity: i8) -> &'static str {
    match verbosity {
        i8::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global fmt subscriber.
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init(verbosity: i8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
