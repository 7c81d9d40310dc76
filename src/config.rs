//! Generator configuration parameters
//!
//! Channel parameter bounds and the scheduler timing policy.  Nothing here
//! is persisted: every session starts from [`TimingConfig::default()`] and
//! freshly validated channel settings.

use serde::{Deserialize, Serialize};

use crate::drivers::task_pin::Core;
use crate::error::ConfigError;

// --- Channel parameter bounds ---

/// Shortest accepted interval between pulse starts.
pub const INTERVAL_MIN_MS: u32 = 1;
/// Longest accepted interval between pulse starts (one hour).
pub const INTERVAL_MAX_MS: u32 = 3_600_000;
/// Shortest accepted pulse.
pub const DURATION_MIN_MS: u32 = 1;
/// Longest accepted pulse.
pub const DURATION_MAX_MS: u32 = 10_000;
/// Highest rate that still maps to a non-zero interval.
pub const PPS_MAX: u32 = 1000;
/// Largest pulse budget the console accepts (nine digits).
pub const MAX_PULSES_LIMIT: u32 = 999_999_999;
/// Number of physical output lines.
pub const MAX_CHANNELS: usize = 2;

/// Scheduler timing policy shared by every channel of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    // --- Pulse loop ---
    /// Poll period while a channel is running (milliseconds)
    pub active_tick_ms: u32,
    /// Idle-wait period while a channel is paused (milliseconds)
    pub pause_poll_ms: u32,

    // --- Session monitor ---
    /// Keystroke / channel-state poll period (milliseconds)
    pub monitor_poll_ms: u32,

    // --- End-of-run indicator ---
    /// Number of blinks after a channel stops
    pub end_blink_count: u8,
    /// Length of each blink phase (milliseconds)
    pub end_blink_phase_ms: u32,

    // --- Tasks ---
    /// Pulse task stack size (KiB)
    pub task_stack_kb: usize,
    /// Pulse task FreeRTOS priority
    pub task_priority: u8,
    /// Pulse task core affinity
    pub task_core: Core,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            // Pulse loop
            active_tick_ms: 1,
            pause_poll_ms: 100,

            // Session monitor
            monitor_poll_ms: 100,

            // End-of-run indicator
            end_blink_count: 3,
            end_blink_phase_ms: 100,

            // Tasks
            task_stack_kb: 8,
            task_priority: 5,
            task_core: Core::Any,
        }
    }
}

impl TimingConfig {
    /// Reject values that would stall or spin the loops.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.active_tick_ms == 0 {
            return Err(ConfigError::InvalidTiming("active tick must be non-zero"));
        }
        if self.pause_poll_ms == 0 {
            return Err(ConfigError::InvalidTiming("pause poll must be non-zero"));
        }
        if self.monitor_poll_ms == 0 {
            return Err(ConfigError::InvalidTiming("monitor poll must be non-zero"));
        }
        if self.task_stack_kb == 0 {
            return Err(ConfigError::InvalidTiming("task stack must be non-zero"));
        }
        Ok(())
    }
}
