//! UART console adapter.
//!
//! Implements [`ConsolePort`] on top of the raw console UART set up by
//! `hw_init::init_console_uart`.  On the host the same calls read stdin
//! and write stdout.

use crate::app::ports::ConsolePort;
use crate::drivers::hw_init;

#[derive(Default)]
pub struct UartConsole;

impl UartConsole {
    pub fn new() -> Self {
        Self
    }
}

impl core::fmt::Write for UartConsole {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        hw_init::uart_write(s.as_bytes());
        Ok(())
    }
}

impl ConsolePort for UartConsole {
    fn read_byte(&mut self, timeout_ms: u32) -> Option<u8> {
        hw_init::uart_read_byte(timeout_ms)
    }
}
