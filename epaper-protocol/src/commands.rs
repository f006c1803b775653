//! Typed display commands
//!
//! Every operation the controller understands, with its parameters. A command
//! maps to exactly one frame:
//!
//! | Command | Payload |
//! |---|---|
//! | set-memory / set-rotation / set-en-font / set-ch-font | 1 byte |
//! | set-baud | baud rate, 4 bytes |
//! | set-color | foreground, background |
//! | draw-pixel | x, y |
//! | draw-line / fill-rect | x0, y0, x1, y1 |
//! | draw-circle / fill-circle | x0, y0, r |
//! | draw-triangle / fill-triangle | x0, y0, x1, y1, x2, y2 |
//! | draw-string / draw-bitmap | x0, y0, NUL-terminated bytes |
//! | everything else | none |
//!
//! Coordinates are signed in the API and travel as raw big-endian 16-bit
//! fields; values outside `i16`/`u16` range keep only their low 16 bits.

use crate::frame::{Frame, FrameBuilder, FrameError};
use crate::opcode::Opcode;
use crate::params::{Color, Font, MemoryMode, Rotation};

/// Commands sent from the host to the display controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Link check
    Handshake,
    /// Switch the controller to another baud rate
    SetBaud(u32),
    /// Request the current baud rate (no reply is read)
    ReadBaud,
    SetMemory(MemoryMode),
    /// Enter stop mode; the controller wakes on the next byte
    StopMode,
    /// Refresh the panel from the frame buffer
    Update,
    SetRotation(Rotation),
    /// Import fonts from TF card into NAND flash
    LoadFont,
    /// Import pictures from TF card into NAND flash
    LoadPicture,
    SetColor {
        foreground: Color,
        background: Color,
    },
    SetEnFont(Font),
    SetChFont(Font),
    DrawPixel {
        x: i32,
        y: i32,
    },
    DrawLine {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    },
    FillRect {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    },
    DrawCircle {
        x0: i32,
        y0: i32,
        r: i32,
    },
    FillCircle {
        x0: i32,
        y0: i32,
        r: i32,
    },
    DrawTriangle {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },
    FillTriangle {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },
    /// Clear the screen with the background color
    Clear,
    /// Draw text (ASCII / GB2312 bytes) with its top-left corner at (x, y)
    DrawString {
        x: i32,
        y: i32,
        text: &'a [u8],
    },
    /// Draw a bitmap stored on the controller, by file name
    DrawBitmap {
        x: i32,
        y: i32,
        name: &'a [u8],
    },
}

impl<'a> Command<'a> {
    /// Opcode this command is sent with
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Handshake => Opcode::Handshake,
            Command::SetBaud(_) => Opcode::SetBaud,
            Command::ReadBaud => Opcode::ReadBaud,
            Command::SetMemory(_) => Opcode::MemoryMode,
            Command::StopMode => Opcode::StopMode,
            Command::Update => Opcode::Update,
            Command::SetRotation(_) => Opcode::ScreenRotation,
            Command::LoadFont => Opcode::LoadFont,
            Command::LoadPicture => Opcode::LoadPicture,
            Command::SetColor { .. } => Opcode::SetColor,
            Command::SetEnFont(_) => Opcode::SetEnFont,
            Command::SetChFont(_) => Opcode::SetChFont,
            Command::DrawPixel { .. } => Opcode::DrawPixel,
            Command::DrawLine { .. } => Opcode::DrawLine,
            Command::FillRect { .. } => Opcode::FillRect,
            Command::DrawCircle { .. } => Opcode::DrawCircle,
            Command::FillCircle { .. } => Opcode::FillCircle,
            Command::DrawTriangle { .. } => Opcode::DrawTriangle,
            Command::FillTriangle { .. } => Opcode::FillTriangle,
            Command::Clear => Opcode::Clear,
            Command::DrawString { .. } => Opcode::DrawString,
            Command::DrawBitmap { .. } => Opcode::DrawBitmap,
        }
    }

    /// Payload length in bytes, NUL terminator included for strings
    pub fn payload_len(&self) -> usize {
        match self {
            Command::Handshake
            | Command::ReadBaud
            | Command::StopMode
            | Command::Update
            | Command::LoadFont
            | Command::LoadPicture
            | Command::Clear => 0,
            Command::SetMemory(_)
            | Command::SetRotation(_)
            | Command::SetEnFont(_)
            | Command::SetChFont(_) => 1,
            Command::SetColor { .. } => 2,
            Command::SetBaud(_) | Command::DrawPixel { .. } => 4,
            Command::DrawCircle { .. } | Command::FillCircle { .. } => 6,
            Command::DrawLine { .. } | Command::FillRect { .. } => 8,
            Command::DrawTriangle { .. } | Command::FillTriangle { .. } => 12,
            Command::DrawString { text, .. } => 4 + text.len() + 1,
            Command::DrawBitmap { name, .. } => 4 + name.len() + 1,
        }
    }

    /// Encode this command into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let mut frame = FrameBuilder::new(self.opcode(), self.payload_len())?;

        match *self {
            Command::Handshake
            | Command::ReadBaud
            | Command::StopMode
            | Command::Update
            | Command::LoadFont
            | Command::LoadPicture
            | Command::Clear => {}
            Command::SetBaud(baud) => {
                frame.put_u32(baud)?;
            }
            Command::SetMemory(mode) => {
                frame.put_u8(mode.to_byte())?;
            }
            Command::SetRotation(rotation) => {
                frame.put_u8(rotation.to_byte())?;
            }
            Command::SetEnFont(font) | Command::SetChFont(font) => {
                frame.put_u8(font.to_byte())?;
            }
            Command::SetColor {
                foreground,
                background,
            } => {
                frame
                    .put_u8(foreground.to_byte())?
                    .put_u8(background.to_byte())?;
            }
            Command::DrawPixel { x, y } => {
                frame.put_coord(x)?.put_coord(y)?;
            }
            Command::DrawLine { x0, y0, x1, y1 } | Command::FillRect { x0, y0, x1, y1 } => {
                frame
                    .put_coord(x0)?
                    .put_coord(y0)?
                    .put_coord(x1)?
                    .put_coord(y1)?;
            }
            Command::DrawCircle { x0, y0, r } | Command::FillCircle { x0, y0, r } => {
                frame.put_coord(x0)?.put_coord(y0)?.put_coord(r)?;
            }
            Command::DrawTriangle {
                x0,
                y0,
                x1,
                y1,
                x2,
                y2,
            }
            | Command::FillTriangle {
                x0,
                y0,
                x1,
                y1,
                x2,
                y2,
            } => {
                frame
                    .put_coord(x0)?
                    .put_coord(y0)?
                    .put_coord(x1)?
                    .put_coord(y1)?
                    .put_coord(x2)?
                    .put_coord(y2)?;
            }
            Command::DrawString { x, y, text: bytes }
            | Command::DrawBitmap { x, y, name: bytes } => {
                frame.put_coord(x)?.put_coord(y)?.put_text(bytes)?;
            }
        }

        frame.finish()
    }

    /// Parse a command back out of a frame
    ///
    /// Coordinates come back sign-extended from 16 bits.
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        let opcode = frame.opcode().ok_or(FrameError::InvalidFrame)?;
        let payload = frame.payload();

        if !opcode.has_text_payload() && payload.len() != fixed_payload_len(opcode) {
            return Err(FrameError::InvalidFrame);
        }

        let coord = |index: usize| {
            i16::from_be_bytes([payload[index * 2], payload[index * 2 + 1]]) as i32
        };

        let command = match opcode {
            Opcode::Handshake => Command::Handshake,
            Opcode::SetBaud => Command::SetBaud(u32::from_be_bytes([
                payload[0], payload[1], payload[2], payload[3],
            ])),
            Opcode::ReadBaud => Command::ReadBaud,
            Opcode::MemoryMode => Command::SetMemory(param(payload[0], MemoryMode::from_byte)?),
            Opcode::StopMode => Command::StopMode,
            Opcode::Update => Command::Update,
            Opcode::ScreenRotation => Command::SetRotation(param(payload[0], Rotation::from_byte)?),
            Opcode::LoadFont => Command::LoadFont,
            Opcode::LoadPicture => Command::LoadPicture,
            Opcode::SetColor => Command::SetColor {
                foreground: param(payload[0], Color::from_byte)?,
                background: param(payload[1], Color::from_byte)?,
            },
            Opcode::SetEnFont => Command::SetEnFont(param(payload[0], Font::from_byte)?),
            Opcode::SetChFont => Command::SetChFont(param(payload[0], Font::from_byte)?),
            Opcode::DrawPixel => Command::DrawPixel {
                x: coord(0),
                y: coord(1),
            },
            Opcode::DrawLine => Command::DrawLine {
                x0: coord(0),
                y0: coord(1),
                x1: coord(2),
                y1: coord(3),
            },
            Opcode::FillRect => Command::FillRect {
                x0: coord(0),
                y0: coord(1),
                x1: coord(2),
                y1: coord(3),
            },
            Opcode::DrawCircle => Command::DrawCircle {
                x0: coord(0),
                y0: coord(1),
                r: coord(2),
            },
            Opcode::FillCircle => Command::FillCircle {
                x0: coord(0),
                y0: coord(1),
                r: coord(2),
            },
            Opcode::DrawTriangle => Command::DrawTriangle {
                x0: coord(0),
                y0: coord(1),
                x1: coord(2),
                y1: coord(3),
                x2: coord(4),
                y2: coord(5),
            },
            Opcode::FillTriangle => Command::FillTriangle {
                x0: coord(0),
                y0: coord(1),
                x1: coord(2),
                y1: coord(3),
                x2: coord(4),
                y2: coord(5),
            },
            Opcode::Clear => Command::Clear,
            Opcode::DrawString => {
                let text = text_payload(payload)?;
                Command::DrawString {
                    x: coord(0),
                    y: coord(1),
                    text,
                }
            }
            Opcode::DrawBitmap => {
                let name = text_payload(payload)?;
                Command::DrawBitmap {
                    x: coord(0),
                    y: coord(1),
                    name,
                }
            }
        };

        Ok(command)
    }
}

/// Payload size of the opcodes whose frames have a fixed length
fn fixed_payload_len(opcode: Opcode) -> usize {
    match opcode {
        Opcode::MemoryMode | Opcode::ScreenRotation | Opcode::SetEnFont | Opcode::SetChFont => 1,
        Opcode::SetColor => 2,
        Opcode::SetBaud | Opcode::DrawPixel => 4,
        Opcode::DrawCircle | Opcode::FillCircle => 6,
        Opcode::DrawLine | Opcode::FillRect => 8,
        Opcode::DrawTriangle | Opcode::FillTriangle => 12,
        _ => 0,
    }
}

fn param<T>(byte: u8, decode: fn(u8) -> Option<T>) -> Result<T, FrameError> {
    decode(byte).ok_or(FrameError::InvalidFrame)
}

/// Split the coordinates off a string payload and strip the terminator
fn text_payload(payload: &[u8]) -> Result<&[u8], FrameError> {
    match payload.split_last() {
        Some((&0, rest)) if rest.len() >= 4 && !rest[4..].contains(&0) => Ok(&rest[4..]),
        _ => Err(FrameError::InvalidFrame),
    }
}
