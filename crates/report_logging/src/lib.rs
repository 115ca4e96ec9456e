#![deny(missing_docs)]
//! Shared logging utilities for the report client workspace.
//!
//! This crate provides the `report_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every record is
//! prefixed with the poll session the controller is currently dispatching
//! for, so interleaved output from a replaced session is easy to tell apart.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Session id of the message currently being dispatched on this thread.
    static SESSION: Cell<u64> = const { Cell::new(0) };
}

/// Sets the session id used to tag log records on the current thread.
/// The controller calls this before applying each message.
pub fn set_session(session: u64) {
    SESSION.with(|v| v.set(session));
}

/// Retrieves the session id for the current thread.
/// Returns 0 before the first submission.
pub fn current_session() -> u64 {
    SESSION.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current session.
#[macro_export]
macro_rules! report_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("[s{}] {}", $crate::current_session(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current session.
#[macro_export]
macro_rules! report_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("[s{}] {}", $crate::current_session(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current session.
#[macro_export]
macro_rules! report_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("[s{}] {}", $crate::current_session(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current session.
#[macro_export]
macro_rules! report_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("[s{}] {}", $crate::current_session(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current session.
#[macro_export]
macro_rules! report_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("[s{}] {}", $crate::current_session(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
