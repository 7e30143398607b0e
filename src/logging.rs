//! Logging setup built on `tracing-subscriber`.
//!
//! `RUST_LOG` always wins. Without it the level comes from the CLI flags:
//! `-q` → error, default → warn, `-v` → info, `-vv` → debug.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Map verbosity flags to a default filter directive.
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Initialize the global subscriber.
///
/// Logs go to stderr, or are appended to `log_file` (without ANSI codes)
/// when one is given.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global
/// subscriber is already installed.
pub fn init_logging(
    verbose: u8,
    quiet: bool,
    log_file: Option<&Path>,
) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ticketdesk={}", level_for(verbose, quiet))));

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true)
            .with_writer(Arc::new(file))
            .try_init()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    Ok(())
}

/// Initialize logging for tests; safe to call from every test.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ticketdesk=debug"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
