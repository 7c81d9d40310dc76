//! Session-wide control flags.
//!
//! One [`ControlState`] per session, shared as `Arc<ControlState>` between
//! the session monitor (the only writer) and every pulse task (readers).
//! The pause flag is mirrored into each channel's own `state` so that a
//! scheduler only ever has to look at its own channel.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

use crate::channel::ChannelConfig;

#[derive(Debug, Default)]
pub struct ControlState {
    system_running: AtomicBool,
    pause_requested: AtomicBool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to `{running: false, pause: false}`.
    pub fn reset(&self) {
        self.system_running.store(false, Ordering::Release);
        self.pause_requested.store(false, Ordering::Release);
    }

    /// Mark the session as firing.
    pub fn start(&self) {
        self.system_running.store(true, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.system_running.load(Ordering::Acquire)
    }

    pub fn is_pause_requested(&self) -> bool {
        self.pause_requested.load(Ordering::Acquire)
    }

    /// Flip the pause flag and broadcast it to every channel.
    ///
    /// Returns the new pause flag.  Channels already in `Stopped` keep
    /// their state.
    pub fn toggle_pause(&self, channels: &[Arc<ChannelConfig>]) -> bool {
        let paused = !self.pause_requested.fetch_xor(true, Ordering::AcqRel);
        for channel in channels {
            if paused {
                channel.pause();
            } else {
                channel.resume();
            }
        }
        info!("CONTROL | {}", if paused { "paused" } else { "resumed" });
        paused
    }

    /// Clear the running flag once every task has been joined.
    pub fn end(&self) {
        self.system_running.store(false, Ordering::Release);
        info!("CONTROL | session ended");
    }

    /// Ask every pulse task to stop at its next tick.
    pub fn request_stop(&self) {
        self.system_running.store(false, Ordering::Release);
        info!("CONTROL | stop requested");
    }
}
