//! Logging setup using tracing.
//!
//! The library itself only emits `tracing` events. Binaries and tests that
//! want to see them call [`init_logging`] once; `log` records from other
//! crates are forwarded to tracing as well.
//!
//! # Example
//!
//! ```no_run
//! use rosimport::logging::init_logging;
//!
//! init_logging();
//! tracing::info!("generation session started");
//! ```

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install a stderr subscriber filtered by `RUST_LOG` (default `info`) and
/// bridge the `log` crate into tracing.
///
/// Calling it again, or after another subscriber was installed, does nothing.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        tracing_log::LogTracer::init().ok();

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_logging();
        init_logging();
        assert!(LOGGER_INITIALIZED.get().is_some());
    }
}
