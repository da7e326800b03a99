use std::thread::sleep;
use std::time::Duration;
use log::trace;
use crate::{GpioOutput, GpioResult};
use crate::led::pt6961::driver::PT6961Driver;

/// GpioPT6961 driver for PT6961 LED controller using GPIO pins.
///
/// Every bit is clocked in by setting the data pin and then pulsing the clock pin high, as the
/// controller latches the data on the rising edge. The clock pin is left low between bytes.
///
/// The controller is fast enough to keep up with GPIO toggled from userspace, so by default there's
/// no delay between the edges. Use [GpioPT6961Driver::with_clock_delay] for long or noisy wiring.
#[derive(Debug)]
pub struct GpioPT6961Driver<'a> {
    pin_clock: &'a dyn GpioOutput,
    pin_strobe: &'a dyn GpioOutput,
    pin_data: &'a dyn GpioOutput,
    clock_delay: Duration,
}

impl<'a> GpioPT6961Driver<'a> {
    /// Creates a new GpioPT6961Driver instance.
    ///
    /// # Parameters
    ///
    /// - `pin_clock`: Clock (CLK) output pin.
    /// - `pin_strobe`: Strobe (STB) output pin. The controller only listens while it's low.
    /// - `pin_data`: Data (DIN) output pin.
    pub fn new(
        pin_clock: &'a dyn GpioOutput,
        pin_strobe: &'a dyn GpioOutput,
        pin_data: &'a dyn GpioOutput,
    ) -> Self {
        GpioPT6961Driver {
            pin_clock,
            pin_strobe,
            pin_data,
            clock_delay: Duration::ZERO,
        }
    }

    /// Sets the time to wait after every clock edge.
    pub fn with_clock_delay(mut self, clock_delay: Duration) -> Self {
        self.clock_delay = clock_delay;
        self
    }

    fn wait(&self) {
        if !self.clock_delay.is_zero() {
            sleep(self.clock_delay);
        }
    }

    fn shift_out(&self, byte: u8) -> GpioResult<()> {
        trace!("Sending byte: {:08b}", byte);

        for bit in 0..8 {
            self.pin_data.write((byte >> bit) & 1 != 0)?;
            self.pin_clock.write(true)?;
            self.wait();
            self.pin_clock.write(false)?;
            self.wait();
        }
        Ok(())
    }
}

impl PT6961Driver for GpioPT6961Driver<'_> {
    fn send(&mut self, bytes: &[u8]) -> GpioResult<()> {
        self.pin_strobe.write(false)?;
        let sent = bytes.iter().try_for_each(|&byte| self.shift_out(byte));
        // Strobe goes back high even if the transfer broke off
        let released = self.pin_strobe.write(true);

        sent.and(released)
    }
}
