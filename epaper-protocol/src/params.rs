//! Single-byte parameter values for configuration commands

/// Drawing color (2-bit grayscale)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Black,
    DarkGray,
    Gray,
    White,
}

impl Color {
    /// Parse a color from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Color::Black),
            0x01 => Some(Color::DarkGray),
            0x02 => Some(Color::Gray),
            0x03 => Some(Color::White),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            Color::Black => 0x00,
            Color::DarkGray => 0x01,
            Color::Gray => 0x02,
            Color::White => 0x03,
        }
    }
}

/// Glyph size for the built-in English (ASCII) and Chinese (GBK) fonts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    /// 32 dot
    Size32,
    /// 48 dot
    Size48,
    /// 64 dot
    Size64,
}

impl Font {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Font::Size32),
            0x02 => Some(Font::Size48),
            0x03 => Some(Font::Size64),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Font::Size32 => 0x01,
            Font::Size48 => 0x02,
            Font::Size64 => 0x03,
        }
    }
}

/// Where the controller looks up fonts and bitmaps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryMode {
    /// On-board NAND flash
    Nand,
    /// Removable TF (microSD) card
    TfCard,
}

impl MemoryMode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(MemoryMode::Nand),
            0x01 => Some(MemoryMode::TfCard),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            MemoryMode::Nand => 0x00,
            MemoryMode::TfCard => 0x01,
        }
    }
}

/// Screen orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    Normal,
    /// Rotated by 180 degrees
    Inverted,
}

impl Rotation {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Rotation::Normal),
            0x01 => Some(Rotation::Inverted),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Rotation::Normal => 0x00,
            Rotation::Inverted => 0x01,
        }
    }
}
