//! PT6961 LED controller driver module.
//!
//! See [PT6961Driver] trait for the command set of the controller, and [GpioPT6961Driver] for the
//! implementation clocking the commands out over three GPIO pins.

mod gpio;

use crate::{GpioError, GpioResult};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
pub use gpio::*;

/// Command prefixes. The two upper bits of every byte starting a transfer select the command.
pub mod command {
    /// Display mode setting, lower bits select the [DisplayLayout](super::DisplayLayout).
    pub const DISPLAY_MODE: u8 = 0x00;
    /// Data setting, see [data_set](super::data_set) for the lower bits.
    pub const DATA_SET: u8 = 0x40;
    /// Display control, see [display_control](super::display_control) for the lower bits.
    pub const DISPLAY_CONTROL: u8 = 0x80;
    /// Address setting, lower bits are the display memory address.
    pub const ADDRESS: u8 = 0xC0;
}

/// Bits of the [DATA_SET](command::DATA_SET) command.
pub mod data_set {
    /// Write data to the display memory.
    pub const WRITE: u8 = 0x00;
    /// Read key data. Keyscan is not wired on the supported displays, so this is never sent.
    pub const READ: u8 = 0x02;
    /// Increment the address after each written byte.
    pub const ADDRESS_INCREMENT: u8 = 0x00;
    /// Keep the address after each written byte.
    pub const ADDRESS_FIXED: u8 = 0x04;
    pub const MODE_NORMAL: u8 = 0x00;
    pub const MODE_TEST: u8 = 0x08;
}

/// Bits of the [DISPLAY_CONTROL](command::DISPLAY_CONTROL) command.
pub mod display_control {
    pub const OFF: u8 = 0x00;
    pub const ON: u8 = 0x08;
    /// Brightness (pulse width) is a 3-bit value in the lowest bits.
    pub const BRIGHTNESS_MASK: u8 = 0x07;
}

/// Number of digits the display memory of the PT6961 can hold. Each digit takes two bytes of it.
pub const MAX_DIGITS: usize = 7;

/// Gets the display memory address command for the given digit.
///
/// Every digit occupies two bytes of the display memory, of which the first one holds the segments
/// wired on the supported displays.
pub fn digit_address(digit: usize) -> u8 {
    command::ADDRESS + 2 * digit as u8
}

/// Grid/segment layout the controller drives, selected with the display mode command.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DisplayLayout {
    /// 6 grids (digits) of 12 segments.
    #[default]
    Digits6Segments12,
    /// 7 grids (digits) of 11 segments.
    Digits7Segments11,
}

impl DisplayLayout {
    /// Gets the lower bits of the display mode command for this layout.
    pub fn bits(self) -> u8 {
        match self {
            DisplayLayout::Digits6Segments12 => 0x02,
            DisplayLayout::Digits7Segments11 => 0x03,
        }
    }
}

impl FromStr for DisplayLayout {
    type Err = GpioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "6x12" => Ok(DisplayLayout::Digits6Segments12),
            "7x11" => Ok(DisplayLayout::Digits7Segments11),
            _ => Err(GpioError::Other("parsing display layout failed".to_string())),
        }
    }
}

impl Display for DisplayLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            DisplayLayout::Digits6Segments12 => "6x12",
            DisplayLayout::Digits7Segments11 => "7x11",
        };
        write!(f, "{}", str)
    }
}

/// The `PT6961Driver` trait defines a low-level interface for PT6961 LED controller drivers.
///
/// # Transfers
///
/// The controller is written to over a 3-wire serial bus: clock, strobe and data. A transfer starts
/// with the strobe line going low, followed by any number of bytes, each shifted out LSb first,
/// and ends with the strobe going high again. The first byte of a transfer is always a command.
/// The bus has no acknowledgement, so a transfer can only fail on the GPIO side.
///
/// # Memory
///
/// The display memory is 14 bytes long, two bytes per digit. The [command::ADDRESS] command sets
/// the address the following data byte is written to.
///
/// Only [PT6961Driver::send] has to be implemented, the commands are built on top of it.
pub trait PT6961Driver: Debug {
    /// Selects the number of grids and segments driven.
    ///
    /// Command: `000000LL`.
    fn set_display_mode(&mut self, layout: DisplayLayout) -> GpioResult<()> {
        self.send_command(command::DISPLAY_MODE | layout.bits())
    }

    /// Sets the data mode for writing the display memory.
    ///
    /// Command: `0100TF00`.
    /// `T` is `1` for test mode, `0` for normal operation.
    /// `F` is `1` for a fixed address, `0` for incrementing the address after every written byte.
    fn set_data_mode(&mut self, fixed_address: bool, test_mode: bool) -> GpioResult<()> {
        let mut command = command::DATA_SET | data_set::WRITE;
        command |= if fixed_address {
            data_set::ADDRESS_FIXED
        } else {
            data_set::ADDRESS_INCREMENT
        };
        command |= if test_mode {
            data_set::MODE_TEST
        } else {
            data_set::MODE_NORMAL
        };
        self.send_command(command)
    }

    /// Turns the display on or off and sets its brightness.
    ///
    /// Command: `1000DBBB`.
    /// `D` is `1` for display on, `0` for display off.
    /// `BBB` is the brightness, `0` being the dimmest. Only the 3 lowest bits of `brightness` are used.
    ///
    /// There's no way to change only one of those, so both have to be sent every time.
    fn set_display_control(&mut self, display_on: bool, brightness: u8) -> GpioResult<()> {
        let mut command = command::DISPLAY_CONTROL;
        command |= if display_on {
            display_control::ON
        } else {
            display_control::OFF
        };
        command |= brightness & display_control::BRIGHTNESS_MASK;
        self.send_command(command)
    }

    /// Writes segments of consecutive digits, starting at digit 0, in a single transfer.
    ///
    /// Every digit is preceded by its own address command, so the transfer does not depend on the
    /// address increment mode.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if there's more segments than [MAX_DIGITS].
    fn write_digits(&mut self, segments: &[u8]) -> GpioResult<()> {
        if segments.len() > MAX_DIGITS {
            return Err(GpioError::InvalidArgument);
        }

        let mut frame = [0u8; 2 * MAX_DIGITS];
        for (i, &bits) in segments.iter().enumerate() {
            frame[2 * i] = digit_address(i);
            frame[2 * i + 1] = bits;
        }
        self.send(&frame[..2 * segments.len()])
    }

    /// Sends a single command byte in its own transfer.
    fn send_command(&mut self, command: u8) -> GpioResult<()> {
        self.send(&[command])
    }

    // Low-level transfer, implemented by the driver implementation.

    /// Sends the bytes in a single strobe-bracketed transfer.
    fn send(&mut self, bytes: &[u8]) -> GpioResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        transfers: Vec<Vec<u8>>,
    }

    impl PT6961Driver for Recorder {
        fn send(&mut self, bytes: &[u8]) -> GpioResult<()> {
            self.transfers.push(bytes.to_vec());
            Ok(())
        }
    }

    #[test]
    fn display_mode_carries_layout_bits() {
        let mut driver = Recorder::default();
        driver.set_display_mode(DisplayLayout::Digits6Segments12).unwrap();
        driver.set_display_mode(DisplayLayout::Digits7Segments11).unwrap();

        assert_eq!(driver.transfers, vec![vec![0x02], vec![0x03]]);
    }

    #[test]
    fn data_mode_bits() {
        let mut driver = Recorder::default();
        driver.set_data_mode(false, false).unwrap();
        driver.set_data_mode(true, false).unwrap();
        driver.set_data_mode(false, true).unwrap();

        assert_eq!(driver.transfers, vec![vec![0x40], vec![0x44], vec![0x48]]);
    }

    #[test]
    fn display_control_masks_brightness() {
        let mut driver = Recorder::default();
        driver.set_display_control(true, 3).unwrap();
        driver.set_display_control(false, 3).unwrap();
        driver.set_display_control(true, 0xFF).unwrap();

        assert_eq!(driver.transfers, vec![vec![0x8B], vec![0x83], vec![0x8F]]);
    }

    #[test]
    fn digits_are_interleaved_with_addresses() {
        let mut driver = Recorder::default();
        driver.write_digits(&[0x3F, 0x06, 0x5B]).unwrap();

        assert_eq!(
            driver.transfers,
            vec![vec![0xC0, 0x3F, 0xC2, 0x06, 0xC4, 0x5B]]
        );
    }

    #[test]
    fn too_many_digits_are_rejected() {
        let mut driver = Recorder::default();

        assert_eq!(
            driver.write_digits(&[0; MAX_DIGITS + 1]),
            Err(GpioError::InvalidArgument)
        );
        assert!(driver.transfers.is_empty());
    }

    #[test]
    fn layout_parses_and_prints() {
        assert_eq!("7x11".parse::<DisplayLayout>(), Ok(DisplayLayout::Digits7Segments11));
        assert_eq!(DisplayLayout::Digits6Segments12.to_string(), "6x12");
        assert!("8x10".parse::<DisplayLayout>().is_err());
    }
}
