use log::{debug, warn};
use crate::{GpioError, GpioResult};
use crate::led::pt6961::driver::{DisplayLayout, PT6961Driver};
use crate::led::pt6961::font::{self, COLON};
use crate::led::pt6961::spinner::{SpinFrame, SpinMode, Spinner};

/// Maximum number of digits [OasisLed] can drive.
pub const DIGIT_CAPACITY: usize = 4;

/// Brightness set on reset, on the 0–7 scale.
pub const DEFAULT_BRIGHTNESS: u8 = 3;

/// Static configuration of the display, fixed when creating the [OasisLed].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DisplayConfig {
    /// Number of digits on the display, 1 to [DIGIT_CAPACITY].
    pub digit_count: u8,
    pub layout: DisplayLayout,
}

impl DisplayConfig {
    pub fn new(digit_count: u8, layout: DisplayLayout) -> Self {
        DisplayConfig { digit_count, layout }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            digit_count: DIGIT_CAPACITY as u8,
            layout: DisplayLayout::default(),
        }
    }
}

/// Driver for the Oasis TOFD-5465GGH-B 4-digit LED display, or any other PT6961-based
/// seven-segment display with up to 4 digits.
///
/// Keeps a copy of the digit segments and the display state, so everything can be resent to the
/// controller at any time. Most setters send the changes right away, except for
/// [OasisLed::set_digit_segments] and [OasisLed::set_digit] with `redraw` set to `false`, which
/// only update the buffer until the next [OasisLed::redraw].
///
/// Nothing is sent on creation, call [OasisLed::init] before using the display.
///
/// Digit 0 is the leftmost one. Writes to digits past the configured count are silently ignored.
#[derive(Debug)]
pub struct OasisLed<D: PT6961Driver> {
    driver: D,
    config: DisplayConfig,
    digits: [u8; DIGIT_CAPACITY],
    colon: bool,
    brightness: u8,
    enabled: bool,
    spinner: Spinner,
}

impl<D: PT6961Driver> OasisLed<D> {
    /// Creates a new display driver on top of the controller `driver`.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if the digit count is `0` or more than [DIGIT_CAPACITY].
    pub fn new(driver: D, config: DisplayConfig) -> GpioResult<Self> {
        if config.digit_count == 0 || config.digit_count as usize > DIGIT_CAPACITY {
            return Err(GpioError::InvalidArgument);
        }

        Ok(OasisLed {
            driver,
            config,
            digits: [0; DIGIT_CAPACITY],
            colon: false,
            brightness: DEFAULT_BRIGHTNESS,
            enabled: true,
            spinner: Spinner::default(),
        })
    }

    /// Initializes the controller and the display, see [OasisLed::reset].
    pub fn init(&mut self) -> GpioResult<()> {
        debug!(
            "Initializing {}-digit display, layout {}",
            self.config.digit_count, self.config.layout
        );
        self.reset()
    }

    /// Resets the display to its power-on state and reprograms the controller.
    ///
    /// The display is turned on with the default brightness, colon and spinner are turned off and
    /// all the digits are cleared. Then the layout, data mode and display control commands are sent,
    /// followed by the blank digits.
    pub fn reset(&mut self) -> GpioResult<()> {
        self.enabled = true;
        self.colon = false;
        self.brightness = DEFAULT_BRIGHTNESS;
        self.spinner.set_mode(SpinMode::Off);
        self.digits = [0; DIGIT_CAPACITY];

        debug!("Resetting {:?}", self.driver);
        self.driver.set_display_mode(self.config.layout)?;
        self.driver.set_data_mode(false, false)?;
        self.update_display_state(self.enabled)?;
        self.redraw()
    }

    /// Sends all the digits to the controller in a single transfer.
    ///
    /// The colon is added to the two leftmost digits here, so it never ends up in the buffer.
    pub fn redraw(&mut self) -> GpioResult<()> {
        let count = self.digit_count();
        let mut segments = self.digits;
        if self.colon {
            for bits in segments.iter_mut().take(2) {
                *bits |= COLON;
            }
        }
        self.driver.write_digits(&segments[..count])
    }

    /// Turns the display on. Digits are kept while the display is off.
    pub fn enable_display(&mut self) -> GpioResult<()> {
        self.update_display_state(true)
    }

    /// Turns the display off, without clearing the digits.
    pub fn disable_display(&mut self) -> GpioResult<()> {
        self.update_display_state(false)
    }

    /// Sets the brightness, `0` being the dimmest and `7` the brightest.
    ///
    /// Only the 3 lowest bits of `brightness` are used. Takes effect immediately.
    pub fn set_brightness(&mut self, brightness: u8) -> GpioResult<()> {
        self.brightness = brightness & 0x07;
        self.update_display_state(self.enabled)
    }

    /// Turns the colon on or off. Redraws only if the state changes.
    pub fn set_colon(&mut self, state: bool) -> GpioResult<()> {
        if state != self.colon {
            self.colon = state;
            self.redraw()?;
        }
        Ok(())
    }

    pub fn toggle_colon(&mut self) -> GpioResult<()> {
        self.set_colon(!self.colon)
    }

    /// Sets the raw segments of a digit, without redrawing.
    ///
    /// See the [font] module for the segment bits. Bit 7 of digits 0 and 1 drives the colon dots,
    /// which can be used to light them separately while [OasisLed::set_colon] is off.
    pub fn set_digit_segments(&mut self, digit: usize, segments: u8) {
        if digit < self.digit_count() {
            self.digits[digit] = segments;
        }
    }

    /// Sets a digit to the hexadecimal value `value`, `0x0` to `0xF`. Higher bits are ignored.
    ///
    /// If `redraw` is `false`, the change is only shown with the next redraw. This allows setting
    /// several digits at once.
    pub fn set_digit(&mut self, digit: usize, value: u8, redraw: bool) -> GpioResult<()> {
        self.set_digit_segments(digit, font::display_bits(value));
        if redraw {
            self.redraw()?;
        }
        Ok(())
    }

    /// Shows a decimal number, right-aligned.
    ///
    /// Leading zeros are blanked unless `leading_zeros` is set. The rightmost digit is always shown,
    /// so `0` is displayed as a single `0`.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if the number has more decimal digits than the display.
    ///   Nothing is changed or sent in that case.
    pub fn set_value(&mut self, value: u16, leading_zeros: bool) -> GpioResult<()> {
        let count = self.digit_count();
        let limit = 10u32.pow(count as u32);
        if value as u32 >= limit {
            return Err(GpioError::InvalidArgument);
        }

        let mut divisor = limit / 10;
        let mut shown = leading_zeros;
        for digit in 0..count {
            let decimal = (value as u32 / divisor % 10) as u8;
            shown |= decimal != 0 || digit == count - 1;
            if shown {
                self.set_digit(digit, decimal, false)?;
            } else {
                self.set_digit_segments(digit, 0x00);
            }
            divisor /= 10;
        }

        self.redraw()
    }

    /// Shows text, left-aligned, blanking the remaining digits.
    ///
    /// Only hexadecimal digits can be shown, anything else is blank. Text longer than the display is
    /// cut off.
    pub fn set_text(&mut self, text: &str) -> GpioResult<()> {
        let count = self.digit_count();
        let mut chars = text.chars();
        for digit in 0..count {
            let segments = match chars.next() {
                Some(c) => {
                    let segments = font::char_bits(c);
                    if segments == 0 && c != ' ' {
                        warn!("No glyph for character: {:?}", c);
                    }
                    segments
                }
                None => 0x00,
            };
            self.digits[digit] = segments;
        }
        if chars.next().is_some() {
            warn!("Text {:?} cut off to {} digits", text, count);
        }

        self.redraw()
    }

    /// Blanks all the digits. Colon is left as is.
    pub fn clear(&mut self) -> GpioResult<()> {
        self.digits = [0; DIGIT_CAPACITY];
        self.redraw()
    }

    /// Sets the spinner mode and rewinds the spinner to its first step.
    ///
    /// Nothing is drawn until the next [OasisLed::spin].
    pub fn set_spinner_mode(&mut self, mode: SpinMode) {
        self.spinner.set_mode(mode);
    }

    /// Moves the spinner one step forward and redraws. Does nothing if the spinner is off.
    ///
    /// [SpinMode::FullDisplay] always writes 4 digits, digits past the configured count are dropped.
    pub fn spin(&mut self) -> GpioResult<()> {
        match self.spinner.advance() {
            None => Ok(()),
            Some(SpinFrame::Digit(segments)) => {
                self.set_digit_segments(0, segments);
                self.redraw()
            }
            Some(SpinFrame::Full(frame)) => {
                for (digit, segments) in frame.into_iter().enumerate() {
                    self.set_digit_segments(digit, segments);
                }
                self.redraw()
            }
        }
    }

    /// Gets the segments for the hexadecimal digit `value`.
    ///
    /// Doesn't depend on the display at all; code without an `OasisLed` at hand can call
    /// [font::display_bits] directly.
    pub fn display_bits(&self, value: u8) -> u8 {
        font::display_bits(value)
    }

    pub fn config(&self) -> DisplayConfig {
        self.config
    }

    /// Gets the segments of all the configured digits, without the colon.
    pub fn digits(&self) -> &[u8] {
        &self.digits[..self.digit_count()]
    }

    pub fn colon(&self) -> bool {
        self.colon
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn spinner_mode(&self) -> SpinMode {
        self.spinner.mode()
    }

    pub fn spin_position(&self) -> u8 {
        self.spinner.position()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    fn digit_count(&self) -> usize {
        self.config.digit_count as usize
    }

    /// Power and brightness share a single command, so both are sent on every change.
    fn update_display_state(&mut self, enabled: bool) -> GpioResult<()> {
        self.enabled = enabled;
        self.driver.set_display_control(self.enabled, self.brightness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::pt6961::font::FULL_SPIN;

    #[derive(Debug, Default)]
    struct Recorder {
        transfers: Vec<Vec<u8>>,
    }

    impl Recorder {
        fn take(&mut self) -> Vec<Vec<u8>> {
            std::mem::take(&mut self.transfers)
        }
    }

    impl PT6961Driver for Recorder {
        fn send(&mut self, bytes: &[u8]) -> GpioResult<()> {
            self.transfers.push(bytes.to_vec());
            Ok(())
        }
    }

    fn display(digit_count: u8) -> OasisLed<Recorder> {
        let config = DisplayConfig::new(digit_count, DisplayLayout::default());
        let mut led = OasisLed::new(Recorder::default(), config).unwrap();
        led.reset().unwrap();
        led.driver_mut().take();
        led
    }

    fn redraw_of(segments: &[u8]) -> Vec<u8> {
        segments
            .iter()
            .enumerate()
            .flat_map(|(i, &bits)| [0xC0 + 2 * i as u8, bits])
            .collect()
    }

    #[test]
    fn digit_count_is_validated() {
        for digit_count in [0, 5, 255] {
            let config = DisplayConfig::new(digit_count, DisplayLayout::default());
            assert_eq!(
                OasisLed::new(Recorder::default(), config).unwrap_err(),
                GpioError::InvalidArgument
            );
        }
        assert!(OasisLed::new(Recorder::default(), DisplayConfig::default()).is_ok());
    }

    #[test]
    fn new_sends_nothing() {
        let led = OasisLed::new(Recorder::default(), DisplayConfig::default()).unwrap();

        assert!(led.driver().transfers.is_empty());
    }

    #[test]
    fn reset_sequence() {
        for layout in [DisplayLayout::Digits6Segments12, DisplayLayout::Digits7Segments11] {
            for digit_count in 1..=4u8 {
                let config = DisplayConfig::new(digit_count, layout);
                let mut led = OasisLed::new(Recorder::default(), config).unwrap();
                led.init().unwrap();

                let blank = redraw_of(&vec![0; digit_count as usize]);
                assert_eq!(
                    led.driver_mut().take(),
                    vec![vec![layout.bits()], vec![0x40], vec![0x8B], blank.clone()]
                );

                led.redraw().unwrap();
                assert_eq!(led.driver_mut().take(), vec![blank]);
            }
        }
    }

    #[test]
    fn reset_restores_the_baseline() {
        let mut led = display(4);
        led.set_value(42, true).unwrap();
        led.set_colon(true).unwrap();
        led.set_brightness(6).unwrap();
        led.disable_display().unwrap();
        led.set_spinner_mode(SpinMode::SingleDigit);
        led.spin().unwrap();

        led.reset().unwrap();

        assert_eq!(led.digits(), &[0, 0, 0, 0]);
        assert!(!led.colon());
        assert_eq!(led.brightness(), DEFAULT_BRIGHTNESS);
        assert!(led.is_enabled());
        assert_eq!(led.spinner_mode(), SpinMode::Off);
        assert_eq!(led.spin_position(), 0);
    }

    #[test]
    fn value_without_leading_zeros() {
        let mut led = display(4);

        led.set_value(1234, false).unwrap();
        assert_eq!(led.digits(), &[0x06, 0x5B, 0x4F, 0x66]);

        led.set_value(7, false).unwrap();
        assert_eq!(led.digits(), &[0x00, 0x00, 0x00, 0x07]);

        led.set_value(305, false).unwrap();
        assert_eq!(led.digits(), &[0x00, 0x4F, 0x3F, 0x6D]);

        assert_eq!(led.driver_mut().take().len(), 3);
    }

    #[test]
    fn value_zero() {
        let mut led = display(4);

        led.set_value(0, true).unwrap();
        assert_eq!(led.digits(), &[0x3F; 4]);

        led.set_value(0, false).unwrap();
        assert_eq!(led.digits(), &[0x00, 0x00, 0x00, 0x3F]);
    }

    #[test]
    fn value_with_leading_zeros() {
        let mut led = display(4);
        led.set_value(42, true).unwrap();

        assert_eq!(led.digits(), &[0x3F, 0x3F, 0x66, 0x5B]);
        assert_eq!(
            led.driver_mut().take(),
            vec![redraw_of(&[0x3F, 0x3F, 0x66, 0x5B])]
        );
    }

    #[test]
    fn value_too_large_is_rejected() {
        let mut led = display(4);
        led.set_value(9999, false).unwrap();
        led.driver_mut().take();

        assert_eq!(led.set_value(10000, false), Err(GpioError::InvalidArgument));
        assert_eq!(led.digits(), &[0x6F; 4]);
        assert!(led.driver().transfers.is_empty());

        let mut led = display(2);
        assert!(led.set_value(99, false).is_ok());
        assert_eq!(led.set_value(100, false), Err(GpioError::InvalidArgument));
    }

    #[test]
    fn colon_redraws_only_on_change() {
        let mut led = display(4);
        led.set_digit(0, 1, false).unwrap();

        led.set_colon(true).unwrap();
        led.set_colon(true).unwrap();

        assert_eq!(
            led.driver_mut().take(),
            vec![redraw_of(&[0x86, 0x80, 0x00, 0x00])]
        );
        assert_eq!(led.digits(), &[0x06, 0x00, 0x00, 0x00]);

        led.toggle_colon().unwrap();
        assert!(!led.colon());
        assert_eq!(
            led.driver_mut().take(),
            vec![redraw_of(&[0x06, 0x00, 0x00, 0x00])]
        );
    }

    #[test]
    fn brightness_is_masked_and_sent_with_power_state() {
        let mut led = display(4);

        led.set_brightness(255).unwrap();
        assert_eq!(led.brightness(), 7);
        assert_eq!(led.driver_mut().take(), vec![vec![0x8F]]);

        led.disable_display().unwrap();
        led.set_brightness(1).unwrap();
        assert_eq!(led.driver_mut().take(), vec![vec![0x87], vec![0x81]]);

        led.enable_display().unwrap();
        assert!(led.is_enabled());
        assert_eq!(led.driver_mut().take(), vec![vec![0x89]]);
    }

    #[test]
    fn power_keeps_digits() {
        let mut led = display(4);
        led.set_value(1234, false).unwrap();

        led.disable_display().unwrap();
        led.enable_display().unwrap();

        assert_eq!(led.digits(), &[0x06, 0x5B, 0x4F, 0x66]);
    }

    #[test]
    fn digits_out_of_range_are_ignored() {
        let mut led = display(2);

        led.set_digit_segments(2, 0xFF);
        assert!(led.driver().transfers.is_empty());

        led.set_digit(5, 8, true).unwrap();
        assert_eq!(led.digits(), &[0x00, 0x00]);
        assert_eq!(led.driver_mut().take(), vec![redraw_of(&[0x00, 0x00])]);
    }

    #[test]
    fn digit_values_are_masked() {
        let mut led = display(4);
        led.set_digit(1, 0x1E, true).unwrap();

        assert_eq!(led.digits()[1], 0x79);
        assert_eq!(led.display_bits(0xE), 0x79);
    }

    #[test]
    fn display_bits_match_the_font() {
        let led = display(1);

        for value in 0..=0xFF {
            assert_eq!(led.display_bits(value), font::display_bits(value));
        }
    }

    #[test]
    fn text() {
        let mut led = display(4);

        led.set_text("bEEF").unwrap();
        assert_eq!(led.digits(), &[0x7C, 0x79, 0x79, 0x71]);

        led.set_text("a1").unwrap();
        assert_eq!(led.digits(), &[0x77, 0x06, 0x00, 0x00]);

        led.set_text("c0ffee").unwrap();
        assert_eq!(led.digits(), &[0x58, 0x3F, 0x71, 0x71]);

        led.set_text("x 9").unwrap();
        assert_eq!(led.digits(), &[0x00, 0x00, 0x6F, 0x00]);

        assert_eq!(led.driver_mut().take().len(), 4);
    }

    #[test]
    fn clear_keeps_colon() {
        let mut led = display(4);
        led.set_value(1234, false).unwrap();
        led.set_colon(true).unwrap();
        led.driver_mut().take();

        led.clear().unwrap();

        assert_eq!(led.digits(), &[0; 4]);
        assert_eq!(
            led.driver_mut().take(),
            vec![redraw_of(&[0x80, 0x80, 0x00, 0x00])]
        );
    }

    #[test]
    fn spinner_off_sends_nothing() {
        let mut led = display(4);
        led.spin().unwrap();

        assert!(led.driver().transfers.is_empty());
    }

    #[test]
    fn single_digit_spinner() {
        let mut led = display(4);
        led.set_value(1234, false).unwrap();
        led.set_spinner_mode(SpinMode::SingleDigit);
        assert_eq!(led.spin_position(), 0);
        led.driver_mut().take();

        let mut positions = Vec::new();
        for _ in 0..6 {
            led.spin().unwrap();
            let position = led.spin_position();
            positions.push(position);
            assert_eq!(led.digits(), &[1 << position, 0x5B, 0x4F, 0x66]);
        }

        assert_eq!(positions, vec![1, 2, 3, 4, 5, 0]);
        assert_eq!(led.driver_mut().take().len(), 6);
    }

    #[test]
    fn full_display_spinner() {
        let mut led = display(4);
        led.set_spinner_mode(SpinMode::FullDisplay);

        let mut frames = Vec::new();
        for _ in 0..12 {
            led.spin().unwrap();
            frames.push(led.digits().to_vec());
        }

        let mut expected: Vec<Vec<u8>> = FULL_SPIN.iter().map(|frame| frame.to_vec()).collect();
        expected.rotate_left(1);
        assert_eq!(frames, expected);

        led.spin().unwrap();
        assert_eq!(led.digits(), frames[0].as_slice());
    }

    #[test]
    fn full_display_spinner_on_smaller_display() {
        let mut led = display(2);
        led.set_spinner_mode(SpinMode::FullDisplay);

        for _ in 0..6 {
            led.spin().unwrap();
        }

        // Frame 6 lights the bottom of digit 0
        assert_eq!(led.digits(), &[0x08, 0x00]);
        for transfer in led.driver_mut().take() {
            assert_eq!(transfer.len(), 4);
        }
    }

    #[test]
    fn spinner_mode_change_rewinds() {
        let mut led = display(4);
        led.set_spinner_mode(SpinMode::FullDisplay);
        led.spin().unwrap();
        led.spin().unwrap();
        assert_eq!(led.spin_position(), 2);

        led.set_spinner_mode(SpinMode::FullDisplay);
        assert_eq!(led.spin_position(), 0);

        led.set_spinner_mode(SpinMode::Off);
        assert_eq!(led.spinner_mode(), SpinMode::Off);
    }
}
