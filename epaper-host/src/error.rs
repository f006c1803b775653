use std::io;
use std::path::PathBuf;

use epaper_drivers::EpdError;
use epaper_protocol::{FrameError, MAX_TEXT_LEN};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Open or line configuration failed; `source.kind()` tells NotFound from PermissionDenied
    #[error("serial device {path} unavailable: {source}")]
    DeviceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("short write: {written} of {expected} bytes sent")]
    ShortWrite { written: usize, expected: usize },

    #[error("payload too large: at most {max} bytes of text fit in one frame")]
    PayloadTooLarge { max: usize },

    #[error("invalid text: {0}")]
    InvalidText(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(FrameError),

    #[error("unsupported baud rate: {0}")]
    UnsupportedBaud(u32),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Kind of the underlying OS error, if there is one
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::DeviceUnavailable { source, .. } => Some(source.kind()),
            Error::Io(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::PayloadTooLarge => Error::PayloadTooLarge { max: MAX_TEXT_LEN },
            FrameError::InteriorNul => {
                Error::InvalidText("string contains a NUL byte".to_string())
            }
            other => Error::InvalidFrame(other),
        }
    }
}

impl From<EpdError<io::Error>> for Error {
    fn from(e: EpdError<io::Error>) -> Self {
        match e {
            EpdError::Frame(e) => e.into(),
            EpdError::Transport(e) => Error::Io(e),
            EpdError::ShortWrite { written, expected } => Error::ShortWrite { written, expected },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
