//! Channel model — one output line's timing policy and runtime progress.
//!
//! ```text
//!   ChannelSpec (immutable, validator-built)
//!        │
//!        ▼
//!   ChannelConfig ── pulses_fired: AtomicU32  (writer: own PulseScheduler)
//!                └── state:        AtomicU8   (writers: PulseScheduler, SessionMonitor)
//! ```
//!
//! A [`ChannelSpec`] can only be obtained from
//! [`validate_channel`](crate::validation::validate_channel), so every
//! channel that reaches a scheduler satisfies `pulse_duration_ms < interval_ms`.

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use serde::Serialize;

/// Fixed-capacity display label.
pub type Label = heapless::String<16>;

/// Physical output identifier (GPIO number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineId(pub i32);

impl LineId {
    pub fn gpio(self) -> i32 {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// How the interval before each pulse is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PulseMode {
    /// Every cycle uses the configured interval.
    Fixed,
    /// Every cycle draws a fresh interval from `[1, interval_ms]`.
    Random,
}

impl fmt::Display for PulseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// Channel life cycle: `Stopped → Running → {Paused ⇄ Running} → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum ChannelState {
    Stopped = 0,
    Running = 1,
    Paused = 2,
}

impl ChannelState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Immutable part
// ═══════════════════════════════════════════════════════════════

/// Validated channel parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSpec {
    pub(crate) line: LineId,
    pub(crate) label: Label,
    pub(crate) interval_ms: u32,
    pub(crate) pulse_duration_ms: u32,
    pub(crate) mode: PulseMode,
    pub(crate) max_pulses: u32,
    pub(crate) derived_pps: u32,
}

impl ChannelSpec {
    pub fn line(&self) -> LineId {
        self.line
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn pulse_duration_ms(&self) -> u32 {
        self.pulse_duration_ms
    }

    pub fn mode(&self) -> PulseMode {
        self.mode
    }

    /// Pulse budget; `0` means unbounded.
    pub fn max_pulses(&self) -> u32 {
        self.max_pulses
    }

    pub fn is_bounded(&self) -> bool {
        self.max_pulses != 0
    }

    /// `floor(1000 / interval_ms)`, display only.
    pub fn derived_pps(&self) -> u32 {
        self.derived_pps
    }
}

// ═══════════════════════════════════════════════════════════════
//  Runtime record
// ═══════════════════════════════════════════════════════════════

/// A channel's spec plus the progress fields shared across tasks.
#[derive(Debug)]
pub struct ChannelConfig {
    spec: ChannelSpec,
    pulses_fired: AtomicU32,
    state: AtomicU8,
    /// Set by the first `begin`.  `Stopped` alone cannot tell a fresh
    /// record from a finished one.
    started: AtomicBool,
}

impl ChannelConfig {
    pub fn new(spec: ChannelSpec) -> Self {
        Self {
            spec,
            pulses_fired: AtomicU32::new(0),
            state: AtomicU8::new(ChannelState::Stopped as u8),
            started: AtomicBool::new(false),
        }
    }

    pub fn spec(&self) -> &ChannelSpec {
        &self.spec
    }

    pub fn label(&self) -> &str {
        self.spec.label()
    }

    pub fn pulses_fired(&self) -> u32 {
        self.pulses_fired.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ChannelState {
        ChannelState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// `Stopped → Running` at session start.  Returns `false` if the
    /// record was already started once; a finished channel stays finished.
    pub fn begin(&self) -> bool {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            && self.transition(ChannelState::Stopped, ChannelState::Running)
    }

    /// `Running → Paused` broadcast.  No effect on a stopped channel.
    pub fn pause(&self) -> bool {
        self.transition(ChannelState::Running, ChannelState::Paused)
    }

    /// `Paused → Running` broadcast.  No effect on a stopped channel.
    pub fn resume(&self) -> bool {
        self.transition(ChannelState::Paused, ChannelState::Running)
    }

    /// Enter the terminal state.
    pub(crate) fn finish(&self) {
        self.state
            .store(ChannelState::Stopped as u8, Ordering::Release);
    }

    /// Count one pulse and return its 1-based index.
    pub(crate) fn record_pulse(&self) -> u32 {
        self.pulses_fired.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn transition(&self, from: ChannelState, to: ChannelState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
