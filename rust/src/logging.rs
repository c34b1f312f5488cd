//! Logging macros for the CPM passes with verbosity level control.
//!
//! Provides zero-cost logging when disabled (verbosity=0).
//! Verbosity levels match the Python wrapper's logger:
//! - 0: SILENT (nothing)
//! - 1: SUMMARY (validation outcome, pass anchors, critical path)
//! - 2: LAYERS (per-layer progress of each pass)
//! - 3: DEBUG (per-task computed values)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_SUMMARY: u8 = 1;
pub const VERBOSITY_LAYERS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at SUMMARY level (verbosity >= 1).
///
/// Used for: validation outcome, makespan, critical path.
#[macro_export]
macro_rules! log_summary {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_SUMMARY {
            eprintln!($($arg)*);
        }
    };
}

/// Log at LAYERS level (verbosity >= 2).
///
/// Used for: layer sizes, sequential vs parallel resolution.
#[macro_export]
macro_rules! log_layers {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_LAYERS {
            eprintln!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_arguments_evaluated_only_when_enabled() {
        let calls = Cell::new(0);
        let count = || {
            calls.set(calls.get() + 1);
            calls.get()
        };

        log_summary!(VERBOSITY_SILENT, "{}", count());
        log_layers!(VERBOSITY_SUMMARY, "{}", count());
        log_debug!(VERBOSITY_LAYERS, "{}", count());
        assert_eq!(calls.get(), 0);

        log_summary!(VERBOSITY_SUMMARY, "{}", count());
        log_layers!(VERBOSITY_DEBUG, "{}", count());
        log_debug!(VERBOSITY_DEBUG, "{}", count());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_log_macros_silent() {
        let verbosity = VERBOSITY_SILENT;
        log_summary!(verbosity, "makespan {}", 10);
        log_layers!(verbosity, "layer {} size {}", 0, 3);
        log_debug!(verbosity, "task {} es={}", "a", 0);
    }
}
