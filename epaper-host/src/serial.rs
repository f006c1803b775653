//! Serial device transport
//!
//! Opens a tty write-only without making it the controlling terminal and
//! puts the line into the mode the display controller expects: raw, fixed
//! baud, 8N1, no flow control, modem lines dropped on close.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};
use std::path::{Path, PathBuf};

use epaper_hal::{DataBits, FlowControl, Parity, StopBits, UartConfig, UartTx};
use log::{debug, info};

use crate::error::{Error, Result};

/// Baud rates the controller supports, with their termios speeds
const BAUD_SPEEDS: [(u32, libc::speed_t); 5] = [
    (9600, libc::B9600),
    (19200, libc::B19200),
    (38400, libc::B38400),
    (57600, libc::B57600),
    (115_200, libc::B115200),
];

/// Baud rates the controller supports
pub fn supported_baudrates() -> impl Iterator<Item = u32> {
    BAUD_SPEEDS.iter().map(|&(baud, _)| baud)
}

/// A serial device connected to the display controller
#[derive(Debug)]
pub struct SerialPort {
    file: File,
    path: PathBuf,
}

impl SerialPort {
    /// Open a serial device by path (e.g. "/dev/ttyUSB0")
    ///
    /// The line is left as the OS configured it; call [`configure`](Self::configure)
    /// before sending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)
            .map_err(|source| Error::DeviceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Opened {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Adopt a descriptor that is already open for writing
    pub fn from_file(file: File) -> Self {
        let path = PathBuf::from(format!("/proc/self/fd/{}", file.as_raw_fd()));
        Self { file, path }
    }

    /// Path the port was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply line settings
    pub fn configure(&self, config: &UartConfig) -> Result<()> {
        let speed = baud_to_speed(config.baudrate)?;
        let fd = self.file.as_raw_fd();

        let mut tty = self.termios(fd)?;

        // SAFETY: `tty` is a valid, initialised termios struct
        unsafe {
            libc::cfmakeraw(&mut tty);
        }
        // SAFETY: `tty` is valid and `speed` is one of the B* constants
        if unsafe { libc::cfsetspeed(&mut tty, speed) } != 0 {
            return Err(self.unavailable(io::Error::last_os_error()));
        }

        tty.c_cflag &= !libc::CSIZE;
        tty.c_cflag |= match config.data_bits {
            DataBits::Seven => libc::CS7,
            DataBits::Eight => libc::CS8,
        };

        match config.parity {
            Parity::None => tty.c_cflag &= !libc::PARENB,
            Parity::Even => {
                tty.c_cflag |= libc::PARENB;
                tty.c_cflag &= !libc::PARODD;
            }
            Parity::Odd => tty.c_cflag |= libc::PARENB | libc::PARODD,
        }

        match config.stop_bits {
            StopBits::One => tty.c_cflag &= !libc::CSTOPB,
            StopBits::Two => tty.c_cflag |= libc::CSTOPB,
        }

        match config.flow_control {
            FlowControl::None => tty.c_cflag &= !libc::CRTSCTS,
            FlowControl::Hardware => tty.c_cflag |= libc::CRTSCTS,
        }

        if config.hangup_on_close {
            tty.c_cflag |= libc::HUPCL;
        } else {
            tty.c_cflag &= !libc::HUPCL;
        }

        // SAFETY: `fd` is open for the lifetime of `self.file`
        if unsafe { libc::tcsetattr(fd, libc::TCSADRAIN, &tty) } != 0 {
            return Err(self.unavailable(io::Error::last_os_error()));
        }

        debug!(
            "Configured {}: {} baud, {:?}, hupcl={}",
            self.path.display(),
            config.baudrate,
            config.flow_control,
            config.hangup_on_close
        );
        Ok(())
    }

    /// Close the device, reporting errors that dropping would swallow
    pub fn close(self) -> Result<()> {
        let fd = self.file.into_raw_fd();
        // SAFETY: ownership of `fd` was released by `into_raw_fd`; it is closed once
        if unsafe { libc::close(fd) } != 0 {
            return Err(Error::Io(io::Error::last_os_error()));
        }
        Ok(())
    }

    fn termios(&self, fd: RawFd) -> Result<libc::termios> {
        // SAFETY: termios is plain data; tcgetattr fills it in
        let mut tty: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut tty) } != 0 {
            return Err(self.unavailable(io::Error::last_os_error()));
        }
        Ok(tty)
    }

    fn unavailable(&self, source: io::Error) -> Error {
        Error::DeviceUnavailable {
            path: self.path.clone(),
            source,
        }
    }
}

impl AsRawFd for SerialPort {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl UartTx for SerialPort {
    type Error = io::Error;

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        loop {
            match self.file.write(data) {
                // Nothing was written; not a partial frame
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn baud_to_speed(baudrate: u32) -> Result<libc::speed_t> {
    BAUD_SPEEDS
        .iter()
        .find(|&&(baud, _)| baud == baudrate)
        .map(|&(_, speed)| speed)
        .ok_or(Error::UnsupportedBaud(baudrate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_baudrates_map() {
        assert_eq!(supported_baudrates().count(), 5);
        for baud in supported_baudrates() {
            assert!(baud_to_speed(baud).is_ok(), "{baud}");
        }
        assert_eq!(baud_to_speed(115_200).unwrap(), libc::B115200);
    }

    #[test]
    fn test_unsupported_baudrate() {
        assert!(matches!(
            baud_to_speed(250_000),
            Err(Error::UnsupportedBaud(250_000))
        ));
    }
}
