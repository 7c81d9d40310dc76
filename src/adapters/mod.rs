//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                   |
//! |------------|---------------|-------------------------------|
//! | `hardware` | OutputPort    | ESP32 GPIO / embedded-hal pin |
//! |            | IoFactory     | per-channel adapter bundle    |
//! | `time`     | Clock         | ESP32 system timer            |
//! | `random`   | RandomSource  | ESP32 hardware RNG            |
//! | `log_sink` | EventSink     | Serial log output             |
//! | `console`  | ConsolePort   | Operator UART                 |

pub mod console;
pub mod hardware;
pub mod log_sink;
pub mod random;
pub mod time;
