//! GPIO / peripheral pin assignments for the pulse generator board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Pulse outputs (active-low pulses, idle HIGH)
// ---------------------------------------------------------------------------

/// Output 1 — always used.
pub const OUTPUT_1_GPIO: i32 = 4;
/// Output 2 — used when the operator selects two outputs.
pub const OUTPUT_2_GPIO: i32 = 5;

/// Output lines in channel order.
pub const OUTPUT_GPIOS: [i32; 2] = [OUTPUT_1_GPIO, OUTPUT_2_GPIO];

// ---------------------------------------------------------------------------
// Operator console (UART0 via USB bridge)
// ---------------------------------------------------------------------------

/// UART peripheral number for the operator console.
pub const CONSOLE_UART_PORT: i32 = 0;
/// Console baud rate.
pub const CONSOLE_BAUD_RATE: u32 = 115_200;
/// RX ring buffer size handed to the UART driver.
pub const CONSOLE_RX_BUFFER: i32 = 1024;
