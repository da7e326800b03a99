//! Segment tables for the Oasis display.
//!
//! Every digit is a single byte, one bit per segment:
//!
//! ```text
//!      A
//!     ---
//!  F |   | B
//!     -G-
//!  E |   | C
//!     ---
//!      D
//! ```
//!
//! Bit 0 is segment `A`, going clockwise to bit 5 (`F`), bit 6 is the middle segment `G`.
//! Bit 7 of the two leftmost digits is wired to the colon dots, see [COLON].

/// Colon dots, bit 7 of digits 0 and 1.
pub const COLON: u8 = 0x80;

/// Hexadecimal font, characters `0` through `F`.
pub const FONT: [u8; 16] = [
    // XGFEDCBA
    0b00111111, // 0
    0b00000110, // 1
    0b01011011, // 2
    0b01001111, // 3
    0b01100110, // 4
    0b01101101, // 5
    0b01111101, // 6
    0b00000111, // 7
    0b01111111, // 8
    0b01101111, // 9
    0b01110111, // A
    0b01111100, // b
    0b01011000, // c
    0b01011110, // d
    0b01111001, // E
    0b01110001, // F
];

/// Frames of the spinner going around the whole 4-digit display, one lit segment at a time.
///
/// Starts at the top of the rightmost digit and runs clockwise, down its right side, along the
/// bottom, up the leftmost digit and back over the top.
/// Hard-coded for exactly 4 digits.
pub const FULL_SPIN: [[u8; 4]; 12] = [
    [0x00, 0x00, 0x00, 0x01],
    [0x00, 0x00, 0x00, 0x02],
    [0x00, 0x00, 0x00, 0x04],
    [0x00, 0x00, 0x00, 0x08],
    [0x00, 0x00, 0x08, 0x00],
    [0x00, 0x08, 0x00, 0x00],
    [0x08, 0x00, 0x00, 0x00],
    [0x10, 0x00, 0x00, 0x00],
    [0x20, 0x00, 0x00, 0x00],
    [0x01, 0x00, 0x00, 0x00],
    [0x00, 0x01, 0x00, 0x00],
    [0x00, 0x00, 0x01, 0x00],
];

/// Gets the segments for the hexadecimal digit `value`.
///
/// Only the lowest 4 bits of `value` are used.
pub fn display_bits(value: u8) -> u8 {
    FONT[(value & 0x0F) as usize]
}

/// Gets the segments for the character `c`.
///
/// Only hexadecimal digits have a glyph, in either case. Every other character is blank (`0`).
pub fn char_bits(c: char) -> u8 {
    match c.to_digit(16) {
        Some(value) => display_bits(value as u8),
        None => 0,
    }
}
