//! Display driver implementations
//!
//! This crate ties the frame codec in `epaper-protocol` to any transmitter
//! implementing [`epaper_hal::UartTx`]:
//!
//! - [`Epd`] - one method per controller command, one frame per call

#![no_std]
#![deny(unsafe_code)]

pub mod epd;

pub use epd::{Epd, EpdError};
