//! Logging bootstrap shared by Vigil binaries.

use std::io::Write;

use env_logger::{Builder, Env};

/// Initialise the global logger with `default_filter` unless `RUST_LOG`
/// overrides it. Safe to call more than once; later calls are no-ops.
///
/// Output goes to stderr with a UTC timestamp per line. Lines that would
/// reveal passphrase material are additionally compiled out of release
/// builds at their call sites, so raising the filter to `trace` on a
/// production binary stays harmless.
pub fn init(default_filter: &str) {
    let env = Env::default().default_filter_or(default_filter);
    let _ = Builder::from_env(env)
        .format(|fmt, record| {
            writeln!(
                fmt,
                "[{} {:<5}] {}",
                fmt.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .try_init();
}
