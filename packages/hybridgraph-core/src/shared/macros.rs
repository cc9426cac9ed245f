//! Shared macros for the codebase
//!
//! Per-entry tracing in the import/export loops is far too chatty for normal
//! runs, so it compiles to nothing unless the `trace` feature is enabled.

/// Per-entry trace event - no-op when trace feature is disabled
#[cfg(not(feature = "trace"))]
#[macro_export]
macro_rules! entry_trace {
    ($($arg:tt)*) => {};
}

/// Per-entry trace event - forwards to `tracing::trace!`
#[cfg(feature = "trace")]
#[macro_export]
macro_rules! entry_trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}
