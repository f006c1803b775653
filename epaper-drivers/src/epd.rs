//! UART e-paper display driver
//!
//! Serial e-paper modules (4.3" class, 800x600, 4 gray levels) take drawing
//! commands over a raw 115200 baud UART link. The protocol has no
//! acknowledgement and no resynchronisation, so each call here:
//!
//! 1. Encodes exactly one frame (see `epaper_protocol::frame`)
//! 2. Hands it to the transmitter in a single `write`
//! 3. Fails with `ShortWrite` if the transmitter took fewer bytes
//!
//! Nothing is retried. A short write leaves a partial frame on the wire and
//! the controller's parser in an unknown state; recovering from that is the
//! caller's decision.

use epaper_hal::UartTx;
use epaper_protocol::{Color, Command, Font, Frame, FrameError, MemoryMode, Rotation};
use log::{trace, warn};

/// Errors from sending a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EpdError<E> {
    /// Command could not be encoded (e.g. string too long)
    Frame(FrameError),
    /// Transmitter reported an error
    Transport(E),
    /// Transmitter accepted only part of the frame
    ShortWrite { written: usize, expected: usize },
}

impl<E> From<FrameError> for EpdError<E> {
    fn from(e: FrameError) -> Self {
        EpdError::Frame(e)
    }
}

/// E-paper display driver
///
/// Owns the transmitter. Not meant to be shared between threads without
/// external locking: frames from concurrent callers would interleave.
pub struct Epd<T> {
    tx: T,
}

impl<T: UartTx> Epd<T> {
    /// Create a driver on top of an already configured transmitter
    pub fn new(tx: T) -> Self {
        Self { tx }
    }

    /// Borrow the transmitter
    pub fn inner(&self) -> &T {
        &self.tx
    }

    /// Give the transmitter back
    pub fn release(self) -> T {
        self.tx
    }

    /// Encode and send one command
    pub fn send(&mut self, command: &Command<'_>) -> Result<(), EpdError<T::Error>> {
        let frame = command.to_frame().map_err(|e| {
            warn!("Cannot encode {:?}: {:?}", command.opcode(), e);
            e
        })?;
        self.send_frame(&frame)
    }

    /// Send an already encoded frame with a single write
    pub fn send_frame(&mut self, frame: &Frame) -> Result<(), EpdError<T::Error>> {
        trace!("TX: {:02x?}", frame.as_bytes());

        let written = self.tx.write(frame.as_bytes()).map_err(EpdError::Transport)?;
        if written != frame.len() {
            warn!("Short write: {} of {} bytes", written, frame.len());
            return Err(EpdError::ShortWrite {
                written,
                expected: frame.len(),
            });
        }

        Ok(())
    }

    /// Flush the transmitter
    pub fn flush(&mut self) -> Result<(), EpdError<T::Error>> {
        self.tx.flush().map_err(EpdError::Transport)
    }

    // --- System commands ---

    pub fn handshake(&mut self) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::Handshake)
    }

    /// Switch the controller to `baud`
    ///
    /// The host side must be reconfigured to the same rate before the next
    /// command.
    pub fn set_baud(&mut self, baud: u32) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::SetBaud(baud))
    }

    /// Request the baud rate. The reply is not read.
    pub fn read_baud(&mut self) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::ReadBaud)
    }

    pub fn set_memory(&mut self, mode: MemoryMode) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::SetMemory(mode))
    }

    pub fn enter_stop_mode(&mut self) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::StopMode)
    }

    /// Refresh the panel with everything drawn since the last update
    pub fn update(&mut self) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::Update)
    }

    pub fn set_rotation(&mut self, rotation: Rotation) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::SetRotation(rotation))
    }

    pub fn load_font(&mut self) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::LoadFont)
    }

    pub fn load_picture(&mut self) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::LoadPicture)
    }

    // --- Display parameters ---

    pub fn set_color(
        &mut self,
        foreground: Color,
        background: Color,
    ) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::SetColor {
            foreground,
            background,
        })
    }

    pub fn set_en_font(&mut self, font: Font) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::SetEnFont(font))
    }

    pub fn set_ch_font(&mut self, font: Font) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::SetChFont(font))
    }

    // --- Drawing ---

    pub fn draw_pixel(&mut self, x: i32, y: i32) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::DrawPixel { x, y })
    }

    pub fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    ) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::DrawLine { x0, y0, x1, y1 })
    }

    pub fn fill_rect(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    ) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::FillRect { x0, y0, x1, y1 })
    }

    pub fn draw_circle(&mut self, x0: i32, y0: i32, r: i32) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::DrawCircle { x0, y0, r })
    }

    pub fn fill_circle(&mut self, x0: i32, y0: i32, r: i32) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::FillCircle { x0, y0, r })
    }

    pub fn draw_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::DrawTriangle {
            x0,
            y0,
            x1,
            y1,
            x2,
            y2,
        })
    }

    pub fn fill_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::FillTriangle {
            x0,
            y0,
            x1,
            y1,
            x2,
            y2,
        })
    }

    /// Clear the screen to the background color
    pub fn clear(&mut self) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::Clear)
    }

    // --- Text and bitmaps ---

    /// Draw a single character
    pub fn draw_char(&mut self, x: i32, y: i32, ch: u8) -> Result<(), EpdError<T::Error>> {
        self.draw_bytes(x, y, &[ch])
    }

    /// Draw a string in the current English font
    pub fn draw_string(&mut self, x: i32, y: i32, text: &str) -> Result<(), EpdError<T::Error>> {
        self.draw_bytes(x, y, text.as_bytes())
    }

    /// Draw pre-encoded text (ASCII or GB2312)
    pub fn draw_bytes(&mut self, x: i32, y: i32, text: &[u8]) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::DrawString { x, y, text })
    }

    /// Draw a bitmap stored on the controller (e.g. `"PIC4.BMP"`)
    pub fn draw_bitmap(&mut self, x: i32, y: i32, name: &str) -> Result<(), EpdError<T::Error>> {
        self.send(&Command::DrawBitmap {
            x,
            y,
            name: name.as_bytes(),
        })
    }
}
