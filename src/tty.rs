//! Terminal I/O utilities for CLI.
//!
//! Provides TTY detection for status output.

use std::io::{self, IsTerminal};

/// Print status message to stderr if running in a terminal.
pub fn status(message: &str) {
    if io::stderr().is_terminal() {
        eprintln!("{}", message);
    }
}

// log_status! macro is defined in the library crate (#[macro_export]) and
// available as modelbump::log_status!.
