//! Software GPIO driver, keeping pin levels in memory.
//!
//! Nothing is driven on real hardware. Instead, every level change is appended to a trace, which
//! can be inspected afterwards, or decoded back into the bytes that would have been clocked out on
//! a synchronous serial bus using [SoftGpioDriver::serial_frames]. Useful for testing display
//! drivers and for dry runs on machines without GPIO.
use crate::{GpioActiveLevel, GpioDriver, GpioError, GpioOutput, GpioPin, GpioResult};
use bitvec::vec::BitVec;
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::AtomicU8;

/// A single recorded level change of an output pin.
///
/// The level is the physical one, i.e. after the active level of the pin was applied.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SoftGpioEvent {
    pub pin: usize,
    pub level: bool,
}

pub struct SoftGpioDriver {
    used_pins: BitVec<AtomicU8>,
    levels: RefCell<Vec<Option<bool>>>,
    events: RefCell<Vec<SoftGpioEvent>>,
}

impl SoftGpioDriver {
    /// Creates a new software driver with `count` pins, none of them configured.
    pub fn new(count: usize) -> Self {
        Self {
            used_pins: BitVec::repeat(false, count),
            levels: RefCell::new(vec![None; count]),
            events: RefCell::new(Vec::new()),
        }
    }

    /// Gets the last physical level written to the pin, or `None` if it was never driven.
    pub fn level(&self, index: usize) -> Option<bool> {
        self.levels.borrow().get(index).copied().flatten()
    }

    /// Gets a copy of the whole trace recorded so far.
    pub fn events(&self) -> Vec<SoftGpioEvent> {
        self.events.borrow().clone()
    }

    /// Forgets the recorded trace. Pin levels are kept.
    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    /// Decodes the recorded trace as a 3-wire synchronous serial bus.
    ///
    /// A frame starts when `strobe` goes low and ends when it goes high again. While the strobe is
    /// low, `data` is sampled on every rising edge of `clock`, and the bits are assembled into
    /// bytes LSb first. Bits of an incomplete trailing byte are dropped.
    ///
    /// Lines that were never driven are assumed to idle with clock low and strobe high.
    pub fn serial_frames(&self, clock: usize, strobe: usize, data: usize) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        let mut current: Option<Vec<u8>> = None;

        let mut clock_level = false;
        let mut data_level = false;
        let mut byte = 0u8;
        let mut bit = 0;

        for event in self.events.borrow().iter() {
            if event.pin == strobe {
                match (event.level, current.take()) {
                    (false, None) => {
                        current = Some(Vec::new());
                        byte = 0;
                        bit = 0;
                    }
                    (false, Some(frame)) => current = Some(frame),
                    (true, Some(frame)) => frames.push(frame),
                    (true, None) => {}
                }
            } else if event.pin == data {
                data_level = event.level;
            } else if event.pin == clock {
                let rising = event.level && !clock_level;
                clock_level = event.level;

                if let (true, Some(frame)) = (rising, current.as_mut()) {
                    if data_level {
                        byte |= 1 << bit;
                    }
                    bit += 1;
                    if bit == 8 {
                        frame.push(byte);
                        byte = 0;
                        bit = 0;
                    }
                }
            }
        }

        frames
    }

    /// Decodes the recorded trace like [SoftGpioDriver::serial_frames], then forgets it.
    ///
    /// Call it between transfers, or the frame in progress is lost.
    pub fn take_serial_frames(&self, clock: usize, strobe: usize, data: usize) -> Vec<Vec<u8>> {
        let frames = self.serial_frames(clock, strobe, data);
        self.clear_events();
        frames
    }
}

impl Debug for SoftGpioDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SoftGpioDriver({})", self.used_pins.len())
    }
}

impl GpioDriver for SoftGpioDriver {
    fn count(&self) -> GpioResult<usize> {
        Ok(self.used_pins.len())
    }

    fn get_pin(&self, index: usize) -> GpioResult<Box<dyn GpioPin + '_>> {
        if index >= self.count()? {
            return Err(GpioError::InvalidArgument);
        }

        if self.used_pins[index] {
            return Err(GpioError::AlreadyInUse);
        }

        self.used_pins.set_aliased(index, true);

        Ok(Box::new(SoftPin {
            driver: self,
            pin_index: index,
            active_level: GpioActiveLevel::High,
        }))
    }
}

struct SoftPin<'a> {
    driver: &'a SoftGpioDriver,
    pin_index: usize,
    active_level: GpioActiveLevel,
}

impl Debug for SoftPin<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[{}]", self.driver, self.pin_index)
    }
}

impl GpioPin for SoftPin<'_> {
    fn as_output(&mut self) -> GpioResult<Box<dyn GpioOutput + '_>> {
        Ok(Box::new(SoftOutput { pin: self }))
    }

    fn supports_active_level(&self) -> bool {
        true
    }

    fn active_level(&self) -> GpioActiveLevel {
        self.active_level
    }

    fn set_active_level(&mut self, level: GpioActiveLevel) -> GpioResult<()> {
        self.active_level = level;
        Ok(())
    }
}

impl Drop for SoftPin<'_> {
    fn drop(&mut self) {
        self.driver.used_pins.set_aliased(self.pin_index, false);
    }
}

struct SoftOutput<'a> {
    pin: &'a SoftPin<'a>,
}

impl Debug for SoftOutput<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[{}][output]", self.pin.driver, self.pin.pin_index)
    }
}

impl GpioOutput for SoftOutput<'_> {
    fn write(&self, value: bool) -> GpioResult<()> {
        let driver = self.pin.driver;
        let level = self.pin.active_level.get_state(value);
        driver.levels.borrow_mut()[self.pin.pin_index] = Some(level);
        driver.events.borrow_mut().push(SoftGpioEvent {
            pin: self.pin.pin_index,
            level,
        });
        Ok(())
    }
}
