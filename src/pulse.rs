//! Per-channel pulse scheduler.
//!
//! One task per output line.  Each task polls its own channel state and
//! the session stop flag, decides when the next pulse is due, and drives
//! its line through the [`OutputPort`].
//!
//! ```text
//!            ┌──────────── pause toggle ───────────┐
//!            ▼                                     │
//!  Stopped ──▶ Running ──── pause toggle ────▶ Paused
//!                │                                 │
//!                │ budget reached / stop flag      │ stop flag
//!                ▼                                 ▼
//!             Stopped ◀────────────────────────────┘
//!           (3 blinks, task exits)
//! ```
//!
//! Timing is measured from the start of the previous pulse (or from task
//! start for the first one).  Time spent paused is excluded.

use std::sync::Arc;
use std::thread::JoinHandle;

use log::{error, info};

use crate::app::events::{PulseEvent, StopReason};
use crate::app::ports::{
    ChannelIo, Clock, EventSink, IDLE_LEVEL, OutputPort, PULSE_LEVEL, RandomSource,
};
use crate::channel::{ChannelConfig, ChannelState, PulseMode};
use crate::config::TimingConfig;
use crate::control::ControlState;
use crate::drivers::task_pin::spawn_on_core;
use crate::error::{Error, Result};

/// Effective interval for a random-mode draw.
///
/// A draw that would not leave the line idle after the pulse is pushed to
/// `pulse_duration_ms + 1`.
pub fn random_interval(draw: u32, pulse_duration_ms: u32) -> u32 {
    if draw <= pulse_duration_ms {
        pulse_duration_ms + 1
    } else {
        draw
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

pub struct PulseScheduler<O, C, R, S> {
    channel: Arc<ChannelConfig>,
    control: Arc<ControlState>,
    timing: TimingConfig,
    io: ChannelIo<O, C, R, S>,
}

impl<O, C, R, S> PulseScheduler<O, C, R, S>
where
    O: OutputPort,
    C: Clock,
    R: RandomSource,
    S: EventSink,
{
    pub fn new(
        channel: Arc<ChannelConfig>,
        control: Arc<ControlState>,
        timing: TimingConfig,
        io: ChannelIo<O, C, R, S>,
    ) -> Self {
        Self {
            channel,
            control,
            timing,
            io,
        }
    }

    /// Run the channel to completion.  Returns the final pulse count.
    pub fn run(mut self) -> u32 {
        let channel = Arc::clone(&self.channel);
        let spec = channel.spec();

        self.io.sink.emit(&PulseEvent::Started {
            label: spec.label(),
            mode: spec.mode(),
            interval_ms: spec.interval_ms(),
            pulse_duration_ms: spec.pulse_duration_ms(),
            max_pulses: spec.max_pulses(),
        });
        self.io.line.set_level(IDLE_LEVEL);

        let mut last_fire_ms = self.io.clock.now_ms();
        let mut effective_ms = self.next_interval();

        let reason = loop {
            if !self.control.is_running() {
                break StopReason::StopRequested;
            }

            match channel.state() {
                ChannelState::Stopped => break StopReason::StopRequested,
                ChannelState::Paused => {
                    let paused_at = self.io.clock.now_ms();
                    self.io.clock.sleep_ms(self.timing.pause_poll_ms);
                    // Paused time does not count towards the interval.
                    last_fire_ms += self.io.clock.now_ms().saturating_sub(paused_at);
                    continue;
                }
                ChannelState::Running => {}
            }

            let now = self.io.clock.now_ms();
            if now.saturating_sub(last_fire_ms) < u64::from(effective_ms) {
                self.io.clock.sleep_ms(self.timing.active_tick_ms);
                continue;
            }

            last_fire_ms = now;
            let index = self.fire(effective_ms, now);

            if spec.is_bounded() && index >= spec.max_pulses() {
                break StopReason::BudgetReached;
            }
            effective_ms = self.next_interval();
        };

        channel.finish();
        self.end_of_run_blinks();

        let pulses = channel.pulses_fired();
        self.io.sink.emit(&PulseEvent::Stopped {
            label: spec.label(),
            pulses,
            reason,
        });
        pulses
    }

    /// Interval before the upcoming pulse.  Random mode draws afresh on
    /// every call.
    fn next_interval(&mut self) -> u32 {
        let spec = self.channel.spec();
        match spec.mode() {
            PulseMode::Fixed => spec.interval_ms(),
            PulseMode::Random => {
                let draw = self.io.rng.uniform(spec.interval_ms());
                random_interval(draw, spec.pulse_duration_ms())
            }
        }
    }

    /// Drive one pulse and return its 1-based index.
    fn fire(&mut self, interval_ms: u32, at_ms: u64) -> u32 {
        let spec = self.channel.spec();

        self.io.line.set_level(PULSE_LEVEL);
        self.io.clock.sleep_ms(spec.pulse_duration_ms());
        self.io.line.set_level(IDLE_LEVEL);

        let index = self.channel.record_pulse();
        self.io.sink.emit(&PulseEvent::Fired {
            label: spec.label(),
            index,
            pulse_duration_ms: spec.pulse_duration_ms(),
            interval_ms,
            at_ms,
        });
        index
    }

    fn end_of_run_blinks(&mut self) {
        let phase = self.timing.end_blink_phase_ms;
        for _ in 0..self.timing.end_blink_count {
            self.io.line.set_level(PULSE_LEVEL);
            self.io.clock.sleep_ms(phase);
            self.io.line.set_level(IDLE_LEVEL);
            self.io.clock.sleep_ms(phase);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Task handle
// ═══════════════════════════════════════════════════════════════

/// A running pulse task.
pub struct TaskHandle {
    name: &'static str,
    inner: JoinHandle<Result<u32>>,
}

impl TaskHandle {
    pub fn name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait for the task and return its final pulse count.
    pub fn join(self) -> Result<u32> {
        self.inner.join().map_err(|_| Error::TaskPanicked)?
    }
}

/// Start a pulse task for `config`.
///
/// A `None` config, or one that already ran in an earlier task, still
/// yields a task: it reports [`Error::NullConfig`] or
/// [`Error::ChannelReused`] through its handle without touching the line,
/// leaving sibling tasks unaffected.  `name` must be null-terminated.
pub fn create_channel<O, C, R, S>(
    name: &'static str,
    config: Option<Arc<ChannelConfig>>,
    control: Arc<ControlState>,
    timing: TimingConfig,
    io: ChannelIo<O, C, R, S>,
) -> Result<TaskHandle>
where
    O: OutputPort + Send + 'static,
    C: Clock + Send + 'static,
    R: RandomSource + Send + 'static,
    S: EventSink + Send + 'static,
{
    let checked = match config {
        None => Err(Error::NullConfig),
        Some(channel) if !channel.begin() => Err(Error::ChannelReused),
        Some(channel) => Ok(channel),
    };
    let started = checked.as_ref().ok().cloned();

    let priority = timing.task_priority;
    let stack_kb = timing.task_stack_kb;
    let core = timing.task_core;
    let spawned = spawn_on_core(core, priority, stack_kb, name, move || {
        let channel = match checked {
            Ok(channel) => channel,
            Err(e) => {
                let task = name.trim_end_matches('\0');
                error!("{}: {}, exiting", task, e);
                let mut sink = io.sink;
                sink.emit(&PulseEvent::Aborted { task, error: e });
                return Err(e);
            }
        };

        info!("{}: pulse task running", channel.label());
        Ok(PulseScheduler::new(channel, control, timing, io).run())
    });

    match spawned {
        Ok(inner) => Ok(TaskHandle { name, inner }),
        Err(e) => {
            if let Some(channel) = started {
                channel.finish();
            }
            Err(e)
        }
    }
}
