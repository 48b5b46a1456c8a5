//! The default input stream, with a probe for pending content.

use std::io::{self, Cursor, Read};

/// A readable input that can report how much content is waiting on it.
pub trait InputSource: Read {
    /// Bytes available without blocking. Zero means "nothing was piped in".
    fn pending_len(&self) -> io::Result<u64>;
}

/// The process's standard input.
#[derive(Debug)]
pub struct StdinSource {
    stdin: io::Stdin,
}

impl StdinSource {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Read for StdinSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdin.read(buf)
    }
}

impl InputSource for StdinSource {
    #[cfg(unix)]
    fn pending_len(&self) -> io::Result<u64> {
        use std::os::fd::AsFd;

        let fd = self.stdin.as_fd().try_clone_to_owned()?;
        let metadata = std::fs::File::from(fd).metadata()?;
        Ok(metadata.len())
    }

    #[cfg(not(unix))]
    fn pending_len(&self) -> io::Result<u64> {
        Ok(0)
    }
}

impl<T: AsRef<[u8]>> InputSource for Cursor<T> {
    fn pending_len(&self) -> io::Result<u64> {
        let total = self.get_ref().as_ref().len() as u64;
        Ok(total.saturating_sub(self.position()))
    }
}
