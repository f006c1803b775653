//! Generic `io::Write` transmitter

use std::fs::File;
use std::io::{self, Write};
use std::os::fd::{AsFd, BorrowedFd};

use epaper_hal::UartTx;

/// Any byte sink as a display transmitter
///
/// Used for standard output (when no device is given, frames go to stdout so
/// they can be piped into another tool), for files, and for capturing frames
/// in memory. The sink must not buffer: a frame counts as sent once `write`
/// returns.
#[derive(Debug)]
pub struct StreamTx<W> {
    inner: W,
}

impl StreamTx<File> {
    /// Unbuffered standard output
    ///
    /// Writes go straight to a duplicate of fd 1, bypassing the line buffer
    /// of `io::Stdout`, which would hold frames back or split them at 0x0A.
    pub fn stdout() -> io::Result<Self> {
        Self::from_fd(io::stdout().as_fd())
    }

    /// Write through a duplicate of an open descriptor
    pub fn from_fd(fd: BorrowedFd<'_>) -> io::Result<Self> {
        Ok(Self::new(File::from(fd.try_clone_to_owned()?)))
    }
}

impl<W: Write> StreamTx<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> UartTx for StreamTx<W> {
    type Error = io::Error;

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        loop {
            match self.inner.write(data) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_into_buffer() {
        let mut tx = StreamTx::new(Vec::new());
        assert_eq!(tx.write(&[0xA5, 0x00]).unwrap(), 2);
        tx.flush().unwrap();
        assert_eq!(tx.into_inner(), vec![0xA5, 0x00]);
    }

    #[test]
    fn test_partial_write_reported() {
        // A fixed-size slice accepts only what fits
        let mut backing = [0u8; 4];
        let mut tx = StreamTx::new(&mut backing[..]);
        assert_eq!(tx.write(&[1, 2, 3, 4, 5, 6]).unwrap(), 4);
    }
}
