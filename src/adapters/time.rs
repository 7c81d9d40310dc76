//! ESP32 time adapter.
//!
//! Provides monotonic time and blocking delays for the pulse tasks.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.
//!
//! Delays on ESP-IDF go straight to `vTaskDelay` with at least one tick.
//! `std::thread::sleep` would turn sub-tick waits into an
//! `esp_rom_delay_us` spin that never yields, starving the console task.
//! `sdkconfig.defaults` sets a 1 kHz tick so a 1 ms sleep is one tick.

use crate::app::ports::Clock;

/// FreeRTOS ticks for a `ms` delay, rounded up and never below one tick.
pub fn delay_ticks(ms: u32, tick_rate_hz: u32) -> u32 {
    let ticks = (u64::from(ms) * u64::from(tick_rate_hz)).div_ceil(1000);
    ticks.clamp(1, u64::from(u32::MAX)) as u32
}

/// Time adapter for the ESP32 platform.  Cheap to clone; every clone
/// shares the same origin.
#[derive(Clone, Copy)]
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic, wraps at `u64::MAX`).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time has no preconditions once the
        // scheduler is running.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Clock for Esp32TimeAdapter {
    fn now_ms(&self) -> u64 {
        self.uptime_us() / 1000
    }

    #[cfg(target_os = "espidf")]
    fn sleep_ms(&self, ms: u32) {
        let ticks = delay_ticks(ms, esp_idf_svc::sys::configTICK_RATE_HZ);
        // SAFETY: called from a task context, never from an ISR.
        unsafe { esp_idf_svc::sys::vTaskDelay(ticks) };
    }

    #[cfg(not(target_os = "espidf"))]
    fn sleep_ms(&self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
