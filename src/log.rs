//! Logging sink passed into a run.
//!
//! The pipeline never talks to a global logger. It receives a [`LogSink`]
//! through [`SanitizeOptions`](crate::SanitizeOptions) and hands it leveled
//! messages built with `format_args!`. The binary wires [`TracingSink`]
//! (with the `tracing` feature); tests can plug in a collecting sink.

use std::fmt;

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Per-file detail (digests, ignored files)
    Debug,
    /// Run progress
    Info,
    /// Recoverable oddities
    Warn,
    /// Per-file failures
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Destination for leveled log messages.
///
/// Implementations must be shareable across worker threads.
pub trait LogSink: Send + Sync {
    /// Record one message.
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>);
}

/// Forwards messages to the `tracing` macros.
#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[cfg(feature = "tracing")]
impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        match level {
            LogLevel::Debug => tracing::debug!("{}", args),
            LogLevel::Info => tracing::info!("{}", args),
            LogLevel::Warn => tracing::warn!("{}", args),
            LogLevel::Error => tracing::error!("{}", args),
        }
    }
}
