//! B/W and greyscale color types for the panels

#[cfg(feature = "graphics")]
use embedded_graphics_core::pixelcolor::{BinaryColor, PixelColor};

/// Pixel encoding of a frame buffer color.
///
/// `bitmask` returns, for a pixel position inside a line:
///  * .0 the mask used to exclude the pixel from its byte
///  * .1 the bits which set the pixel in the byte
pub trait ColorType {
    /// Number of bits used to represent one pixel
    const BITS_PER_PIXEL: usize;

    /// Mask and value bits of this color at the given line position
    fn bitmask(&self, pos: u32) -> (u8, u8);
}

/// Only for the black/white displays
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    /// Black color
    Black,
    /// White color
    White,
}

impl Color {
    /// Get the color encoding of the color for one bit
    pub fn get_bit_value(self) -> u8 {
        match self {
            Color::White => 1u8,
            Color::Black => 0u8,
        }
    }

    /// Gets a full byte of black or white pixels
    pub fn get_byte_value(self) -> u8 {
        match self {
            Color::White => 0xff,
            Color::Black => 0x00,
        }
    }

    /// Returns the inverse of the given color
    pub fn inverse(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl ColorType for Color {
    const BITS_PER_PIXEL: usize = 1;

    fn bitmask(&self, pos: u32) -> (u8, u8) {
        let bit = 7 - (pos % 8) as u8;
        (!(1 << bit), self.get_bit_value() << bit)
    }
}

impl From<u8> for Color {
    fn from(value: u8) -> Self {
        match value {
            0 => Color::Black,
            1 => Color::White,
            e => panic!(
                "DisplayColor only parses 0 and 1 (Black and White) and not `{}`",
                e
            ),
        }
    }
}

#[cfg(feature = "graphics")]
impl PixelColor for Color {
    type Raw = ();
}

#[cfg(feature = "graphics")]
impl From<BinaryColor> for Color {
    fn from(b: BinaryColor) -> Color {
        match b {
            BinaryColor::On => Color::Black,
            BinaryColor::Off => Color::White,
        }
    }
}

/// The four grey levels of the greyscale waveform.
///
/// Two bits per pixel, MSB first, larger values are lighter. The encoding
/// matches what the greyscale pixel packer expects for 2bpp sources.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Grey4 {
    /// 0b00
    Black,
    /// 0b01
    DarkGrey,
    /// 0b10
    LightGrey,
    /// 0b11
    White,
}

impl Grey4 {
    /// The two-bit encoding of this level
    pub fn level(self) -> u8 {
        match self {
            Grey4::Black => 0b00,
            Grey4::DarkGrey => 0b01,
            Grey4::LightGrey => 0b10,
            Grey4::White => 0b11,
        }
    }

    /// A full byte of four pixels of this level
    pub fn get_byte_value(self) -> u8 {
        self.level() * 0b0101_0101
    }
}

impl ColorType for Grey4 {
    const BITS_PER_PIXEL: usize = 2;

    fn bitmask(&self, pos: u32) -> (u8, u8) {
        let shift = 6 - 2 * (pos % 4) as u8;
        (!(0b11 << shift), self.level() << shift)
    }
}

impl From<Color> for Grey4 {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Grey4::Black,
            Color::White => Grey4::White,
        }
    }
}

#[cfg(feature = "graphics")]
impl PixelColor for Grey4 {
    type Raw = ();
}
