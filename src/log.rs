// src/log.rs
//! House logging macros on top of `tracing`.
//!
//! `logf!` / `logd!` / `loge!` stay the call-site vocabulary; the binary
//! decides where the events end up (stderr or a log file) via [`init`].

#[doc(hidden)]
pub use tracing as __tracing;

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        $crate::log::__tracing::info!($($arg)*)
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        $crate::log::__tracing::debug!($($arg)*)
    };
}

/// Warn-level logging
#[macro_export]
macro_rules! logw {
    ($($arg:tt)*) => {
        $crate::log::__tracing::warn!($($arg)*)
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        $crate::log::__tracing::error!($($arg)*)
    };
}

#[cfg(feature = "cli")]
pub use init_impl::init;

#[cfg(feature = "cli")]
mod init_impl {
    use std::fs::OpenOptions;
    use std::path::Path;
    use std::sync::Mutex;

    use tracing_subscriber::EnvFilter;

    use crate::config::consts::DEFAULT_LOG_FILTER;
    use crate::error::{Error, Result};

    /// Install the global subscriber.
    ///
    /// `RUST_LOG` wins when set; otherwise `verbose` picks debug over the
    /// default info filter. With `log_file` the events are appended there
    /// instead of stderr, without ANSI colours.
    pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
        let fallback = if verbose { "citeflag=debug" } else { DEFAULT_LOG_FILTER };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(fallback));

        let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

        match log_file {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    crate::file::ensure_directory(parent)?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| Error::io(path, e))?;
                builder.with_ansi(false).with_writer(Mutex::new(file)).init();
            }
            None => builder.with_writer(std::io::stderr).init(),
        }
        Ok(())
    }
}
