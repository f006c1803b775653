//! Epaper Hardware Abstraction Layer
//!
//! This crate defines the transport seam between the e-paper frame codec and
//! whatever carries the bytes to the display controller. The same driver code
//! runs against a host serial device, standard output, or an in-memory sink
//! in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  epaper-drivers (Epd<T: UartTx>)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  epaper-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  SerialPort   │       │  StreamTx<W>  │
//! │ (epaper-host) │       │ (epaper-host) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`] - Serial transmit side, one write per frame

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

pub use uart::{DataBits, FlowControl, Parity, StopBits, UartConfig, UartTx, DEFAULT_BAUDRATE};
