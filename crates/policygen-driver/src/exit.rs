//! How a failed run is reported.
//!
//! Every error ends up here. Outside debug mode the message is printed on one
//! line and the process exits with status 1. In debug mode, or when there is no
//! message to print, the process panics with the message and a backtrace.

use std::backtrace::Backtrace;
use std::fmt::Display;
use std::process;

/// Exit status for a reported failure.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// How a failure will be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Panic carrying the message and a captured backtrace.
    Trace(String),
    /// One line on stderr, then exit with [`FAILURE_EXIT_CODE`].
    Terse(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExitPolicy {
    debug: bool,
}

impl ExitPolicy {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    pub fn decide(&self, message: &str) -> Verdict {
        if self.debug || message.is_empty() {
            Verdict::Trace(message.to_string())
        } else {
            Verdict::Terse(message.to_string())
        }
    }

    /// Report `error` and end the process.
    pub fn fail(&self, error: impl Display) -> ! {
        match self.decide(&error.to_string()) {
            Verdict::Trace(message) => {
                let trace = Backtrace::force_capture();
                panic!("{message}\n\n{trace}");
            }
            Verdict::Terse(message) => {
                eprintln!("{message}");
                process::exit(FAILURE_EXIT_CODE);
            }
        }
    }
}
