//! Invocation mode selection.

use std::path::PathBuf;

/// How the driver was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Generator config files were named on the command line.
    Batch(Vec<PathBuf>),
    /// No paths: a `ResourceList` arrives on stdin and one is written to stdout.
    Streamed,
}

impl Mode {
    /// Pick the mode from the positional arguments alone.
    pub fn select(paths: Vec<PathBuf>) -> Self {
        if paths.is_empty() {
            Mode::Streamed
        } else {
            Mode::Batch(paths)
        }
    }
}
