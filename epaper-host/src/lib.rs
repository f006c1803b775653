//! Host-side support for UART e-paper displays
//!
//! - [`serial::SerialPort`] - a tty opened and configured for the display link
//! - [`stream::StreamTx`] - any `std::io::Write` as a transmitter (stdout, files, buffers)
//! - [`config::HostConfig`] - `epaper.toml` settings
//!
//! Both transmitters implement [`epaper_hal::UartTx`] and plug into
//! [`epaper_drivers::Epd`].

pub mod config;
pub mod error;
pub mod serial;
pub mod stream;

pub use config::{HostConfig, SerialConfig, DEFAULT_CONFIG_PATH};
pub use error::{Error, Result};
pub use serial::{supported_baudrates, SerialPort};
pub use stream::StreamTx;
