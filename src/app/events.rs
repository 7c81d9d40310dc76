//! Outbound pulse-task events.
//!
//! Schedulers emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them — log to
//! the serial console, record them in a test, etc.

use crate::channel::PulseMode;
use crate::error::Error;

/// Why a channel entered `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `pulses_fired` reached `max_pulses`.
    BudgetReached,
    /// The session stop flag was observed.
    StopRequested,
}

/// Structured records emitted by a pulse task.
#[derive(Debug, Clone, PartialEq)]
pub enum PulseEvent<'a> {
    /// The task took ownership of its line.
    Started {
        label: &'a str,
        mode: PulseMode,
        interval_ms: u32,
        pulse_duration_ms: u32,
        max_pulses: u32,
    },

    /// A pulse completed.  `interval_ms` is the effective interval of the
    /// cycle it opened.
    Fired {
        label: &'a str,
        index: u32,
        pulse_duration_ms: u32,
        interval_ms: u32,
        at_ms: u64,
    },

    /// The task left its loop and finished the end-of-run blinks.
    Stopped {
        label: &'a str,
        pulses: u32,
        reason: StopReason,
    },

    /// The task could not run at all.
    Aborted { task: &'a str, error: Error },
}
