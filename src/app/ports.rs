//! Port traits — the hexagonal boundary between the pulse engine and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PulseScheduler / SessionMonitor (domain)
//! ```
//!
//! Driven adapters (output lines, clocks, RNG, event sinks, console)
//! implement these traits.  The domain consumes them via generics, so the
//! scheduling core never touches hardware directly and every timing path
//! can be driven by a virtual clock in tests.
//!
//! All hardware-facing operations are infallible by contract: a line write,
//! a clock read, or a random draw has no error path.

use crate::app::events::PulseEvent;
use crate::channel::ChannelSpec;

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Electrical level of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

/// Level held between pulses.
pub const IDLE_LEVEL: Level = Level::High;
/// Level held for the duration of a pulse (active-low pulses).
pub const PULSE_LEVEL: Level = Level::Low;

/// Write-side port for one physical output line.
pub trait OutputPort {
    fn set_level(&mut self, level: Level);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond time plus blocking delay.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.  Never decreases.
    fn now_ms(&self) -> u64;

    /// Block the calling task for `ms` milliseconds.
    fn sleep_ms(&self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Random source
// ───────────────────────────────────────────────────────────────

pub trait RandomSource {
    /// Uniform draw from `[1, max]`.  `max` is at least 1.
    fn uniform(&mut self, max: u32) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// Pulse tasks emit structured [`PulseEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &PulseEvent<'_>);
}

// ───────────────────────────────────────────────────────────────
// Console port (driven adapter: operator terminal)
// ───────────────────────────────────────────────────────────────

/// Byte-level operator terminal.  Output goes through [`core::fmt::Write`].
pub trait ConsolePort: core::fmt::Write {
    /// Wait up to `timeout_ms` for one byte.  `0` polls without waiting.
    fn read_byte(&mut self, timeout_ms: u32) -> Option<u8>;
}

// ───────────────────────────────────────────────────────────────
// Per-channel I/O bundle
// ───────────────────────────────────────────────────────────────

/// Everything one pulse task needs from the hardware.  Moved into the task.
pub struct ChannelIo<O, C, R, S> {
    pub line: O,
    pub clock: C,
    pub rng: R,
    pub sink: S,
}

/// Builds a [`ChannelIo`] per channel so the session monitor can start
/// schedulers without knowing which adapters back them.
pub trait IoFactory {
    type Line: OutputPort + Send + 'static;
    type Clock: Clock + Send + 'static;
    type Rng: RandomSource + Send + 'static;
    type Sink: EventSink + Send + 'static;

    fn io_for(&mut self, spec: &ChannelSpec) -> ChannelIo<Self::Line, Self::Clock, Self::Rng, Self::Sink>;
}
