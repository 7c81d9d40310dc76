//! Pulse output line driver.
//!
//! A dumb digital output: remembers the last level written and forwards it
//! to the GPIO.  Pulse timing lives in the scheduler, not here.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the pin via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct OutputLine {
    pin: i32,
    high: bool,
    writes: u32,
}

impl OutputLine {
    /// Wrap an already-initialised pin.  Lines idle HIGH.
    pub fn new(pin: i32) -> Self {
        Self {
            pin,
            high: true,
            writes: 0,
        }
    }

    pub fn set_high(&mut self) {
        self.write(true);
    }

    pub fn set_low(&mut self) {
        self.write(false);
    }

    fn write(&mut self, high: bool) {
        hw_init::gpio_write(self.pin, high);
        self.high = high;
        self.writes = self.writes.wrapping_add(1);
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Number of level writes since construction.
    pub fn write_count(&self) -> u32 {
        self.writes
    }
}
