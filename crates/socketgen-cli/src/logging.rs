//! Diagnostic logging setup
//!
//! Progress messages go to stdout with `println!`; `tracing` events (file
//! selection, fallbacks, per-language emission) go to stderr. The filter comes
//! from `SOCKETGEN_LOG` when set, otherwise from the `-v`/`-q` flags.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "SOCKETGEN_LOG";

/// Map `-q` and repeated `-v` flags to a level.
pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Initialize the global subscriber.
///
/// Call once at startup. A subscriber that is already installed is left alone.
pub fn init_logging(default_level: LevelFilter) {
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time(),
    );

    // Try to set as global default (ignore error if already set)
    let _ = tracing::subscriber::set_global_default(subscriber);
}
