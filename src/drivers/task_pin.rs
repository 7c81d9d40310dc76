//! Core-pinned thread spawning for the pulse tasks.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread::spawn` creates a
//! FreeRTOS task pinned to a specific CPU core with explicit priority
//! and stack size. On non-ESP targets, falls back to plain thread spawn.
//!
//! # ESP-IDF Threading Model
//!
//! ESP-IDF implements `std::thread` via pthreads, which are thin wrappers
//! around FreeRTOS tasks. `esp_pthread_set_cfg()` sets thread-local
//! configuration that applies to the *next* `pthread_create()` call from
//! the calling thread, so the config→spawn pair must not be interleaved
//! with other thread creation on the same thread.

use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// FreeRTOS `tskNO_AFFINITY`.
pub const NO_AFFINITY: i32 = 0x7FFF_FFFF;

/// Core affinity for a spawned task.
///
/// Single-core parts (ESP32-C3, -C6, -H2) reject any pinned core other
/// than 0, so [`Core::Any`] is the portable choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Core {
    /// Let the scheduler place the task.
    Any,
    /// Core 0 (PRO_CPU).
    Pro,
    /// Core 1 (APP_CPU), dual-core parts only.
    App,
}

impl Core {
    /// Value for `esp_pthread_cfg_t::pin_to_core`.
    pub fn raw_id(self) -> i32 {
        match self {
            Self::Any => NO_AFFINITY,
            Self::Pro => 0,
            Self::App => 1,
        }
    }
}

/// Spawn a thread pinned to a specific core with explicit priority and stack.
///
/// `name` must be null-terminated (e.g. `"pulse-1\0"`).
#[cfg(target_os = "espidf")]
pub fn spawn_on_core<T: Send + 'static>(
    core: Core,
    priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() -> T + Send + 'static,
) -> Result<JoinHandle<T>, Error> {
    // SAFETY: the config struct is fully initialised by the default
    // constructor and `thread_name` points at a 'static nul-terminated str.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = core.raw_id();
        cfg.prio = priority as i32;
        cfg.stack_size = (stack_kb * 1024) as i32;
        cfg.thread_name = name.as_ptr() as *const _;
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as i32 {
            log::error!("esp_pthread_set_cfg failed (rc={})", ret);
            return Err(Error::Spawn);
        }
    }

    let display_name = name.trim_end_matches('\0');
    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        display_name,
        core,
        priority,
        stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
        .map_err(|e| {
            log::error!("spawn '{}' failed: {}", display_name, e);
            Error::Spawn
        })
}

/// Host debug builds need far deeper stacks than the firmware.
#[cfg(not(target_os = "espidf"))]
const SIM_MIN_STACK: usize = 64 * 1024;

/// Simulation fallback — ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core<T: Send + 'static>(
    _core: Core,
    _priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() -> T + Send + 'static,
) -> Result<JoinHandle<T>, Error> {
    let display_name = name.trim_end_matches('\0');
    log::info!(
        "Spawning '{}' (sim, no core pinning, stack={}KB)",
        display_name,
        stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .stack_size((stack_kb * 1024).max(SIM_MIN_STACK))
        .spawn(f)
        .map_err(|e| {
            log::error!("spawn '{}' failed: {}", display_name, e);
            Error::Spawn
        })
}
