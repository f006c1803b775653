//! Host configuration (`epaper.toml`)
//!
//! ```toml
//! log_level = "info"
//!
//! [serial]
//! device = "/dev/ttyUSB0"   # omit to write frames to stdout
//! baudrate = 115200
//! configure = true          # apply raw mode / baud / HUPCL after opening
//! hangup_on_close = true
//! ```
//!
//! Every key is optional.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use epaper_hal::{UartConfig, DEFAULT_BAUDRATE};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "epaper.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// env_logger filter used when `RUST_LOG` is not set
    pub log_level: Option<String>,
    pub serial: SerialConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialConfig {
    /// Serial device; `None` sends frames to stdout
    pub device: Option<PathBuf>,
    pub baudrate: u32,
    /// Apply line settings after opening (disable for ptys and plain files)
    pub configure: bool,
    pub hangup_on_close: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: None,
            baudrate: DEFAULT_BAUDRATE,
            configure: true,
            hangup_on_close: true,
        }
    }
}

impl HostConfig {
    /// Parse a TOML document
    pub fn from_toml(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a config file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let input = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    /// Load a config file, falling back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(input) => Self::from_toml(&input),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::Config(format!("{}: {e}", path.display()))),
        }
    }

    /// Line settings for the serial device
    pub fn uart_config(&self) -> UartConfig {
        UartConfig {
            hangup_on_close: self.serial.hangup_on_close,
            ..UartConfig::default().with_baudrate(self.serial.baudrate)
        }
    }
}
