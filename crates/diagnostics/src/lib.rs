//! Logging facade shared by every crate in the workspace
//!
//! Usage:
//! - Set FSSTORE_LOG=off (default) - no logs
//! - Set FSSTORE_LOG=info - index rebuild summaries
//! - Set FSSTORE_LOG=warn - skipped log entries (decrypt/parse failures)
//! - Set FSSTORE_LOG=debug - every replayed operation and pre-flight rejection

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable selecting the minimum level
pub const LOG_ENV: &str = "FSSTORE_LOG";

static INIT: Once = Once::new();

/// Parse a level name; `None` means logging is off.
fn parse_level(value: &str) -> Option<emit::Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" | "" => None,
        "debug" => Some(emit::Level::Debug),
        "warn" => Some(emit::Level::Warn),
        "error" => Some(emit::Level::Error),
        _ => Some(emit::Level::Info),
    }
}

/// Initialize diagnostics based on the FSSTORE_LOG environment variable
///
/// Safe to call multiple times; subsequent calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        let Some(level) = parse_level(&value) else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The runtime must outlive the process; flushing happens on exit.
        std::mem::forget(rt);
    });
}

/// Log basic operations (index rebuilds, appended entries)
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (replayed operations, skipped preconditions)
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable problems (undecryptable or unparseable log entries)
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that prevent an operation from completing
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init_diagnostics();
        init_diagnostics();
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("off"), None);
        assert_eq!(parse_level(""), None);
        assert_eq!(parse_level("DEBUG"), Some(emit::Level::Debug));
        assert_eq!(parse_level("warn"), Some(emit::Level::Warn));
        assert_eq!(parse_level("error"), Some(emit::Level::Error));
        assert_eq!(parse_level("info"), Some(emit::Level::Info));
        assert_eq!(parse_level("bogus"), Some(emit::Level::Info));
    }

    #[test]
    fn test_macros_compile() {
        let entries = 3usize;
        info!("Rebuilt index from {entries} entries", entries: entries);
        debug!("Debug message with {value}", value: 42);
        warn!("Warning message");
        error!("Error message");
    }
}
