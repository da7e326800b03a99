//! PT6961 LED controller module, as used by the Oasis TOFD-5465GGH-B 4-digit display.
//!
//! The module is split the same way the display is driven:
//! - [driver] knows the command set of the chip and how to clock bytes into it,
//! - [font] holds the static segment tables,
//! - [spinner] is the animation state machine,
//! - [OasisLed] owns the digit buffer and ties everything together.
//!
//! Keyscan is not implemented, as the Oasis module does not wire the keyboard matrix out.

pub mod driver;
pub mod font;
pub mod spinner;
mod oasis;

pub use oasis::*;
