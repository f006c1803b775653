//! E-paper Display Command Protocol
//!
//! This crate encodes the byte-oriented command protocol spoken by UART
//! e-paper display controllers. The host sends one frame per display
//! operation; the controller never answers on this path.
//!
//! # Protocol Overview
//!
//! All commands use the same frame layout:
//! ```text
//! ┌────────┬────────┬────────┬─────────────┬─────────────┬──────────┐
//! │ MARKER │ LENGTH │ OPCODE │ PAYLOAD     │ TRAILER     │ CHECKSUM │
//! │ 0xA5   │ 2B BE  │ 1B     │ 0–503B      │ CC 33 C3 3C │ 1B XOR   │
//! └────────┴────────┴────────┴─────────────┴─────────────┴──────────┘
//! ```
//!
//! LENGTH counts the whole frame, marker and checksum included. The checksum
//! is the XOR of every byte before it.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

pub mod commands;
pub mod frame;
pub mod opcode;
pub mod params;

pub use commands::Command;
pub use frame::{
    checksum, frame_len, Frame, FrameBuilder, FrameError, FrameParser, FRAME_MARKER,
    FRAME_OVERHEAD, FRAME_TRAILER, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, MAX_TEXT_LEN,
};
pub use opcode::Opcode;
pub use params::{Color, Font, MemoryMode, Rotation};
