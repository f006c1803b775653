//! Command opcodes understood by the display controller

/// One byte identifying the operation a frame invokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    /// Link check
    Handshake,
    /// Change the controller's UART baud rate
    SetBaud,
    /// Ask the controller for its baud rate
    ReadBaud,
    /// Select NAND flash or TF card as asset storage
    MemoryMode,
    /// Enter low-power stop mode
    StopMode,
    /// Push the frame buffer to the panel
    Update,
    /// Set screen rotation
    ScreenRotation,
    /// Copy fonts from TF card to NAND flash
    LoadFont,
    /// Copy pictures from TF card to NAND flash
    LoadPicture,
    /// Set foreground and background colors
    SetColor,
    /// Select the English font size
    SetEnFont,
    /// Select the Chinese font size
    SetChFont,
    DrawPixel,
    DrawLine,
    FillRect,
    DrawCircle,
    FillCircle,
    DrawTriangle,
    FillTriangle,
    /// Clear the screen with the background color
    Clear,
    DrawString,
    /// Draw a stored bitmap by file name
    DrawBitmap,
}

// Wire format values
const CMD_HANDSHAKE: u8 = 0x00;
const CMD_SET_BAUD: u8 = 0x01;
const CMD_READ_BAUD: u8 = 0x02;
const CMD_MEMORY_MODE: u8 = 0x07;
const CMD_STOP_MODE: u8 = 0x08;
const CMD_UPDATE: u8 = 0x0A;
const CMD_SCREEN_ROTATION: u8 = 0x0D;
const CMD_LOAD_FONT: u8 = 0x0E;
const CMD_LOAD_PICTURE: u8 = 0x0F;
const CMD_SET_COLOR: u8 = 0x10;
const CMD_SET_EN_FONT: u8 = 0x1E;
const CMD_SET_CH_FONT: u8 = 0x1F;
const CMD_DRAW_PIXEL: u8 = 0x20;
const CMD_DRAW_LINE: u8 = 0x22;
const CMD_FILL_RECT: u8 = 0x24;
const CMD_DRAW_CIRCLE: u8 = 0x26;
const CMD_FILL_CIRCLE: u8 = 0x27;
const CMD_DRAW_TRIANGLE: u8 = 0x28;
const CMD_FILL_TRIANGLE: u8 = 0x29;
const CMD_CLEAR: u8 = 0x2E;
const CMD_DRAW_STRING: u8 = 0x30;
const CMD_DRAW_BITMAP: u8 = 0x70;

impl Opcode {
    /// Every opcode, in wire-value order
    pub const ALL: [Opcode; 22] = [
        Opcode::Handshake,
        Opcode::SetBaud,
        Opcode::ReadBaud,
        Opcode::MemoryMode,
        Opcode::StopMode,
        Opcode::Update,
        Opcode::ScreenRotation,
        Opcode::LoadFont,
        Opcode::LoadPicture,
        Opcode::SetColor,
        Opcode::SetEnFont,
        Opcode::SetChFont,
        Opcode::DrawPixel,
        Opcode::DrawLine,
        Opcode::FillRect,
        Opcode::DrawCircle,
        Opcode::FillCircle,
        Opcode::DrawTriangle,
        Opcode::FillTriangle,
        Opcode::Clear,
        Opcode::DrawString,
        Opcode::DrawBitmap,
    ];

    /// Parse an opcode from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_HANDSHAKE => Some(Opcode::Handshake),
            CMD_SET_BAUD => Some(Opcode::SetBaud),
            CMD_READ_BAUD => Some(Opcode::ReadBaud),
            CMD_MEMORY_MODE => Some(Opcode::MemoryMode),
            CMD_STOP_MODE => Some(Opcode::StopMode),
            CMD_UPDATE => Some(Opcode::Update),
            CMD_SCREEN_ROTATION => Some(Opcode::ScreenRotation),
            CMD_LOAD_FONT => Some(Opcode::LoadFont),
            CMD_LOAD_PICTURE => Some(Opcode::LoadPicture),
            CMD_SET_COLOR => Some(Opcode::SetColor),
            CMD_SET_EN_FONT => Some(Opcode::SetEnFont),
            CMD_SET_CH_FONT => Some(Opcode::SetChFont),
            CMD_DRAW_PIXEL => Some(Opcode::DrawPixel),
            CMD_DRAW_LINE => Some(Opcode::DrawLine),
            CMD_FILL_RECT => Some(Opcode::FillRect),
            CMD_DRAW_CIRCLE => Some(Opcode::DrawCircle),
            CMD_FILL_CIRCLE => Some(Opcode::FillCircle),
            CMD_DRAW_TRIANGLE => Some(Opcode::DrawTriangle),
            CMD_FILL_TRIANGLE => Some(Opcode::FillTriangle),
            CMD_CLEAR => Some(Opcode::Clear),
            CMD_DRAW_STRING => Some(Opcode::DrawString),
            CMD_DRAW_BITMAP => Some(Opcode::DrawBitmap),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            Opcode::Handshake => CMD_HANDSHAKE,
            Opcode::SetBaud => CMD_SET_BAUD,
            Opcode::ReadBaud => CMD_READ_BAUD,
            Opcode::MemoryMode => CMD_MEMORY_MODE,
            Opcode::StopMode => CMD_STOP_MODE,
            Opcode::Update => CMD_UPDATE,
            Opcode::ScreenRotation => CMD_SCREEN_ROTATION,
            Opcode::LoadFont => CMD_LOAD_FONT,
            Opcode::LoadPicture => CMD_LOAD_PICTURE,
            Opcode::SetColor => CMD_SET_COLOR,
            Opcode::SetEnFont => CMD_SET_EN_FONT,
            Opcode::SetChFont => CMD_SET_CH_FONT,
            Opcode::DrawPixel => CMD_DRAW_PIXEL,
            Opcode::DrawLine => CMD_DRAW_LINE,
            Opcode::FillRect => CMD_FILL_RECT,
            Opcode::DrawCircle => CMD_DRAW_CIRCLE,
            Opcode::FillCircle => CMD_FILL_CIRCLE,
            Opcode::DrawTriangle => CMD_DRAW_TRIANGLE,
            Opcode::FillTriangle => CMD_FILL_TRIANGLE,
            Opcode::Clear => CMD_CLEAR,
            Opcode::DrawString => CMD_DRAW_STRING,
            Opcode::DrawBitmap => CMD_DRAW_BITMAP,
        }
    }

    /// Returns true if frames for this opcode carry a NUL-terminated string
    pub fn has_text_payload(&self) -> bool {
        matches!(self, Opcode::DrawString | Opcode::DrawBitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for opcode in Opcode::ALL {
            assert_eq!(Opcode::from_byte(opcode.to_byte()), Some(opcode));
        }
    }

    #[test]
    fn test_opcode_wire_values() {
        assert_eq!(Opcode::Handshake.to_byte(), 0x00);
        assert_eq!(Opcode::MemoryMode.to_byte(), 0x07);
        assert_eq!(Opcode::Update.to_byte(), 0x0A);
        assert_eq!(Opcode::DrawPixel.to_byte(), 0x20);
        assert_eq!(Opcode::Clear.to_byte(), 0x2E);
        assert_eq!(Opcode::DrawString.to_byte(), 0x30);
        assert_eq!(Opcode::DrawBitmap.to_byte(), 0x70);
    }

    #[test]
    fn test_unknown_byte() {
        assert_eq!(Opcode::from_byte(0x03), None);
        assert_eq!(Opcode::from_byte(0x21), None);
        assert_eq!(Opcode::from_byte(0xFF), None);
    }

    #[test]
    fn test_text_payload_opcodes() {
        assert!(Opcode::DrawString.has_text_payload());
        assert!(Opcode::DrawBitmap.has_text_payload());
        assert!(!Opcode::DrawPixel.has_text_payload());
    }
}
