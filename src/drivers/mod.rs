//! Output line driver, hardware initialisation, and task helpers.

pub mod hw_init;
pub mod output_line;
pub mod task_pin;
