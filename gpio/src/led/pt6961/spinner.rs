//! Spinner animation, a single lit segment running around one digit or the whole display.
//!
//! The spinner has no notion of time, it moves one step forward every time [Spinner::advance] is
//! called. Driving it at a steady pace is up to the caller.

use crate::led::pt6961::font::FULL_SPIN;

/// Spinner animation mode.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SpinMode {
    /// No animation, the display is left alone.
    #[default]
    Off,
    /// A segment runs around the outline of the leftmost digit.
    SingleDigit,
    /// A segment runs around the outline of the whole display.
    ///
    /// **Always drives 4 digits.** On displays with less digits the extra frames are dropped.
    FullDisplay,
}

impl SpinMode {
    /// Gets the number of steps in a single revolution.
    pub fn steps(self) -> u8 {
        match self {
            SpinMode::Off => 0,
            SpinMode::SingleDigit => 6,
            SpinMode::FullDisplay => FULL_SPIN.len() as u8,
        }
    }
}

/// Segments to show for a single spinner step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SpinFrame {
    /// Segments of the leftmost digit.
    Digit(u8),
    /// Segments of the 4 leftmost digits.
    Full([u8; 4]),
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Spinner {
    mode: SpinMode,
    position: u8,
}

impl Spinner {
    pub fn mode(&self) -> SpinMode {
        self.mode
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    /// Switches the mode and rewinds to the first step, even if the mode doesn't change.
    pub fn set_mode(&mut self, mode: SpinMode) {
        self.mode = mode;
        self.position = 0;
    }

    /// Moves to the next step and gets the segments to show for it.
    ///
    /// Returns `None` if the spinner is off.
    pub fn advance(&mut self) -> Option<SpinFrame> {
        let steps = self.mode.steps();
        if steps == 0 {
            return None;
        }

        self.position = (self.position + 1) % steps;

        match self.mode {
            SpinMode::Off => None,
            SpinMode::SingleDigit => Some(SpinFrame::Digit(1 << self.position)),
            SpinMode::FullDisplay => Some(SpinFrame::Full(FULL_SPIN[self.position as usize])),
        }
    }
}
