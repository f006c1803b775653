//! Frame encoding and decoding for the e-paper command protocol.
//!
//! Frame format:
//! - MARKER (1 byte): 0xA5
//! - LENGTH (2 bytes, big-endian): total frame length, marker through checksum
//! - OPCODE (1 byte): command identifier
//! - PAYLOAD (0-503 bytes): command-specific parameters
//! - TRAILER (4 bytes): CC 33 C3 3C
//! - CHECKSUM (1 byte): XOR of every preceding byte
//!
//! Frames are assembled with [`FrameBuilder`], which declares the payload
//! length up front so the length field is known before any payload byte is
//! written, and refuses to finish a frame whose payload does not match it.

use heapless::Vec;

use crate::opcode::Opcode;

/// Frame synchronization byte
pub const FRAME_MARKER: u8 = 0xA5;

/// Fixed bytes between the payload and the checksum
pub const FRAME_TRAILER: [u8; 4] = [0xCC, 0x33, 0xC3, 0x3C];

/// MARKER + LENGTH + OPCODE
pub const HEADER_SIZE: usize = 4;

/// TRAILER + CHECKSUM
pub const TRAILER_SIZE: usize = FRAME_TRAILER.len() + 1;

/// Bytes every frame carries regardless of payload
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + TRAILER_SIZE;

/// Maximum complete frame size (size of the controller's command buffer)
pub const MAX_FRAME_SIZE: usize = 512;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - FRAME_OVERHEAD;

/// Longest string a draw-string or draw-bitmap frame can carry
/// (payload minus two coordinates and the NUL terminator)
pub const MAX_TEXT_LEN: usize = MAX_PAYLOAD_SIZE - 4 - 1;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload would not fit in a frame of `MAX_FRAME_SIZE` bytes
    PayloadTooLarge,
    /// String payload contains a NUL byte before its end
    InteriorNul,
    /// Payload written does not match the length declared in the header
    LengthMismatch,
    /// Length field outside `FRAME_OVERHEAD..=MAX_FRAME_SIZE` or not matching the data
    InvalidLength,
    /// Frame does not start with `FRAME_MARKER`
    InvalidMarker,
    /// Trailer bytes are not CC 33 C3 3C
    InvalidTrailer,
    /// Checksum mismatch
    InvalidChecksum,
    /// Frame is incomplete (need more bytes)
    Incomplete,
    /// Opcode or payload does not describe a known command
    InvalidFrame,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            FrameError::PayloadTooLarge => "payload does not fit in one frame",
            FrameError::InteriorNul => "string contains a NUL byte",
            FrameError::LengthMismatch => "payload length differs from declared length",
            FrameError::InvalidLength => "invalid length field",
            FrameError::InvalidMarker => "missing 0xA5 marker",
            FrameError::InvalidTrailer => "bad trailer",
            FrameError::InvalidChecksum => "checksum mismatch",
            FrameError::Incomplete => "incomplete frame",
            FrameError::InvalidFrame => "unknown command or malformed payload",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

/// XOR of all bytes
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &b| acc ^ b)
}

/// Total frame length for a payload of `payload_len` bytes
pub const fn frame_len(payload_len: usize) -> usize {
    FRAME_OVERHEAD + payload_len
}

/// A complete, checksummed frame ready for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8, MAX_FRAME_SIZE>,
}

impl Frame {
    /// Build a frame from an opcode and a raw payload
    pub fn new(opcode: Opcode, payload: &[u8]) -> Result<Self, FrameError> {
        let mut builder = FrameBuilder::new(opcode, payload.len())?;
        builder.put_bytes(payload)?;
        builder.finish()
    }

    /// Validate a complete frame and copy it
    pub fn from_bytes(data: &[u8]) -> Result<Self, FrameError> {
        validate(data)?;
        let mut bytes = Vec::new();
        bytes
            .extend_from_slice(data)
            .map_err(|_| FrameError::InvalidLength)?;
        Ok(Self { bytes })
    }

    /// The frame as it goes on the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes on the wire
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Value of the length field
    pub fn declared_len(&self) -> u16 {
        u16::from_be_bytes([self.bytes[1], self.bytes[2]])
    }

    /// Raw opcode byte
    pub fn opcode_byte(&self) -> u8 {
        self.bytes[3]
    }

    /// Decoded opcode, if known
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_byte(self.opcode_byte())
    }

    /// Bytes between the opcode and the trailer
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_SIZE..self.bytes.len() - TRAILER_SIZE]
    }

    /// Final checksum byte
    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Check marker, length field, trailer and checksum of a complete frame
fn validate(data: &[u8]) -> Result<(), FrameError> {
    if data.len() < HEADER_SIZE {
        return Err(FrameError::Incomplete);
    }
    if data[0] != FRAME_MARKER {
        return Err(FrameError::InvalidMarker);
    }

    let declared = u16::from_be_bytes([data[1], data[2]]) as usize;
    if !(FRAME_OVERHEAD..=MAX_FRAME_SIZE).contains(&declared) {
        return Err(FrameError::InvalidLength);
    }
    if data.len() < declared {
        return Err(FrameError::Incomplete);
    }
    if data.len() != declared {
        return Err(FrameError::InvalidLength);
    }

    let (body, sum) = data.split_at(declared - 1);
    if body[body.len() - FRAME_TRAILER.len()..] != FRAME_TRAILER {
        return Err(FrameError::InvalidTrailer);
    }
    if checksum(body) != sum[0] {
        return Err(FrameError::InvalidChecksum);
    }

    Ok(())
}

/// Incremental frame assembly
///
/// The payload length is declared when the builder is created so the header
/// can be written first; payload bytes are then appended in order and
/// [`finish`](FrameBuilder::finish) adds the trailer and checksum.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    bytes: Vec<u8, MAX_FRAME_SIZE>,
    total_len: usize,
}

impl FrameBuilder {
    /// Start a frame for `opcode` carrying exactly `payload_len` payload bytes
    ///
    /// Fails with `PayloadTooLarge` before touching the buffer if the frame
    /// would exceed `MAX_FRAME_SIZE`.
    pub fn new(opcode: Opcode, payload_len: usize) -> Result<Self, FrameError> {
        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let total_len = frame_len(payload_len);
        let mut bytes = Vec::new();
        // Capacity checked above
        let _ = bytes.push(FRAME_MARKER);
        let _ = bytes.extend_from_slice(&(total_len as u16).to_be_bytes());
        let _ = bytes.push(opcode.to_byte());

        Ok(Self { bytes, total_len })
    }

    /// Payload bytes still expected
    pub fn remaining(&self) -> usize {
        self.total_len - TRAILER_SIZE - self.bytes.len()
    }

    /// Append raw payload bytes
    pub fn put_bytes(&mut self, data: &[u8]) -> Result<&mut Self, FrameError> {
        if data.len() > self.remaining() {
            return Err(FrameError::LengthMismatch);
        }
        // Fits: remaining() never exceeds spare capacity
        let _ = self.bytes.extend_from_slice(data);
        Ok(self)
    }

    pub fn put_u8(&mut self, value: u8) -> Result<&mut Self, FrameError> {
        self.put_bytes(&[value])
    }

    /// Append a big-endian 16-bit value
    pub fn put_u16(&mut self, value: u16) -> Result<&mut Self, FrameError> {
        self.put_bytes(&value.to_be_bytes())
    }

    /// Append a big-endian 32-bit value
    pub fn put_u32(&mut self, value: u32) -> Result<&mut Self, FrameError> {
        self.put_bytes(&value.to_be_bytes())
    }

    /// Append a coordinate as a raw 16-bit field
    ///
    /// Values outside the 16-bit range keep only their low 16 bits.
    pub fn put_coord(&mut self, value: i32) -> Result<&mut Self, FrameError> {
        self.put_u16(value as u16)
    }

    /// Append a string followed by its NUL terminator
    pub fn put_text(&mut self, text: &[u8]) -> Result<&mut Self, FrameError> {
        if text.contains(&0) {
            return Err(FrameError::InteriorNul);
        }
        if text.len() + 1 > self.remaining() {
            return Err(FrameError::LengthMismatch);
        }
        self.put_bytes(text)?;
        self.put_u8(0)
    }

    /// Append trailer and checksum
    pub fn finish(mut self) -> Result<Frame, FrameError> {
        if self.remaining() != 0 {
            return Err(FrameError::LengthMismatch);
        }

        let _ = self.bytes.extend_from_slice(&FRAME_TRAILER);
        let sum = checksum(&self.bytes);
        let _ = self.bytes.push(sum);

        Ok(Frame { bytes: self.bytes })
    }
}

/// State machine for parsing frames out of a byte stream
///
/// Used on the host for inspecting captured traffic; the display link itself
/// never carries frames back to the host.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    expected_length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for MARKER byte
    WaitingForMarker,
    /// Got MARKER, waiting for LENGTH high byte
    WaitingForLengthHigh,
    /// Waiting for LENGTH low byte
    WaitingForLengthLow,
    /// Reading opcode, payload, trailer and checksum
    ReadingBody,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForMarker,
            buffer: Vec::new(),
            expected_length: 0,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForMarker;
        self.buffer.clear();
        self.expected_length = 0;
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    ///
    /// A stray marker right before a real frame makes the real marker land in
    /// the length field. No valid length starts with 0xA5, so when the length
    /// is out of range and one of its bytes is a marker, parsing restarts from
    /// that byte instead of failing.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::WaitingForMarker => {
                if byte == FRAME_MARKER {
                    self.buffer.clear();
                    let _ = self.buffer.push(byte);
                    self.state = ParseState::WaitingForLengthHigh;
                }
                // Silently ignore non-MARKER bytes while waiting
                Ok(None)
            }
            ParseState::WaitingForLengthHigh => {
                let _ = self.buffer.push(byte);
                self.state = ParseState::WaitingForLengthLow;
                Ok(None)
            }
            ParseState::WaitingForLengthLow => {
                let _ = self.buffer.push(byte);
                let length = u16::from_be_bytes([self.buffer[1], byte]) as usize;
                if !(FRAME_OVERHEAD..=MAX_FRAME_SIZE).contains(&length) {
                    let high = self.buffer[1];
                    self.reset();
                    if high == FRAME_MARKER {
                        let _ = self.buffer.push(high);
                        let _ = self.buffer.push(byte);
                        self.state = ParseState::WaitingForLengthLow;
                        return Ok(None);
                    }
                    if byte == FRAME_MARKER {
                        let _ = self.buffer.push(byte);
                        self.state = ParseState::WaitingForLengthHigh;
                        return Ok(None);
                    }
                    return Err(FrameError::InvalidLength);
                }
                self.expected_length = length;
                self.state = ParseState::ReadingBody;
                Ok(None)
            }
            ParseState::ReadingBody => {
                // Cannot overflow: expected_length <= MAX_FRAME_SIZE
                let _ = self.buffer.push(byte);
                if self.buffer.len() < self.expected_length {
                    return Ok(None);
                }

                let result = validate(&self.buffer).map(|()| Frame {
                    bytes: self.buffer.clone(),
                });
                self.reset();
                result.map(Some)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
