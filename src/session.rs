//! Session monitor — owns one firing session.
//!
//! ```text
//!  ConsolePort ──keys──▶ SessionMonitor ──toggle/stop──▶ ControlState
//!                            │    ▲                          │
//!                   spawn    │    │ poll state               │ broadcast
//!                            ▼    │                          ▼
//!                     PulseScheduler × N ◀──── own ChannelConfig state
//! ```
//!
//! The monitor is the only writer of the control flags and of broadcast
//! state transitions.  It never talks to a pulse task directly.

use std::sync::Arc;

use log::{error, info, warn};
use serde::Serialize;

use crate::app::commands::OperatorCommand;
use crate::app::ports::{Clock, ConsolePort, IoFactory};
use crate::channel::{ChannelConfig, ChannelSpec, ChannelState, LineId, PulseMode};
use crate::config::{MAX_CHANNELS, TimingConfig};
use crate::control::ControlState;
use crate::error::{ConfigError, Result};
use crate::pulse::{TaskHandle, create_channel};

/// Task names, null-terminated for the pthread config, in channel order.
const TASK_NAMES: [&str; MAX_CHANNELS] = ["pulse-1\0", "pulse-2\0"];

// ═══════════════════════════════════════════════════════════════
//  Report
// ═══════════════════════════════════════════════════════════════

/// End-of-session summary for one channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    pub label: heapless::String<16>,
    pub line: LineId,
    pub mode: PulseMode,
    pub interval_ms: u32,
    pub pulse_duration_ms: u32,
    pub max_pulses: u32,
    pub pulses_fired: u32,
    /// `false` if the task aborted or panicked.
    pub completed: bool,
}

/// End-of-session summary.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub channels: heapless::Vec<ChannelReport, MAX_CHANNELS>,
    pub stop_requested: bool,
    pub elapsed_ms: u64,
}

impl SessionReport {
    pub fn total_pulses(&self) -> u64 {
        self.channels.iter().map(|c| u64::from(c.pulses_fired)).sum()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Monitor
// ═══════════════════════════════════════════════════════════════

pub struct SessionMonitor<C: Clock> {
    control: Arc<ControlState>,
    channels: heapless::Vec<Arc<ChannelConfig>, MAX_CHANNELS>,
    tasks: heapless::Vec<TaskHandle, MAX_CHANNELS>,
    timing: TimingConfig,
    clock: C,
    started_at_ms: u64,
    stop_requested: bool,
}

impl<C: Clock> SessionMonitor<C> {
    /// Build a session from freshly validated channel specs.
    pub fn new(
        control: Arc<ControlState>,
        specs: impl IntoIterator<Item = ChannelSpec>,
        timing: TimingConfig,
        clock: C,
    ) -> Result<Self> {
        timing.validate()?;

        let mut channels = heapless::Vec::new();
        for spec in specs {
            channels
                .push(Arc::new(ChannelConfig::new(spec)))
                .map_err(|_| ConfigError::TooManyChannels)?;
        }

        Ok(Self {
            control,
            channels,
            tasks: heapless::Vec::new(),
            timing,
            clock,
            started_at_ms: 0,
            stop_requested: false,
        })
    }

    pub fn control(&self) -> &Arc<ControlState> {
        &self.control
    }

    pub fn channels(&self) -> &[Arc<ChannelConfig>] {
        &self.channels
    }

    /// Raise the running flag and start one pulse task per channel.
    ///
    /// If a task cannot be spawned, the tasks already started are stopped
    /// and joined before the error is returned.
    pub fn start<F: IoFactory>(&mut self, factory: &mut F) -> Result<()> {
        self.control.start();
        self.started_at_ms = self.clock.now_ms();

        for (channel, name) in self.channels.iter().zip(TASK_NAMES) {
            let io = factory.io_for(channel.spec());
            let spawned = create_channel(
                name,
                Some(Arc::clone(channel)),
                Arc::clone(&self.control),
                self.timing.clone(),
                io,
            );
            match spawned {
                Ok(task) => {
                    // Capacity equals the channel count.
                    let _ = self.tasks.push(task);
                }
                Err(e) => {
                    error!("SESSION | could not start '{}': {}", channel.label(), e);
                    self.control.request_stop();
                    for task in core::mem::take(&mut self.tasks) {
                        let _ = task.join();
                    }
                    return Err(e);
                }
            }
        }

        info!("SESSION | {} channel(s) firing", self.tasks.len());
        Ok(())
    }

    pub fn toggle_pause(&self) -> bool {
        self.control.toggle_pause(&self.channels)
    }

    pub fn request_stop(&mut self) {
        self.stop_requested = true;
        self.control.request_stop();
    }

    pub fn dispatch(&mut self, command: OperatorCommand) {
        match command {
            OperatorCommand::TogglePause => {
                self.toggle_pause();
            }
            OperatorCommand::Stop => self.request_stop(),
        }
    }

    /// Drain pending keystrokes without waiting.
    pub fn poll_input(&mut self, console: &mut impl ConsolePort) {
        while let Some(key) = console.read_byte(0) {
            if let Some(command) = OperatorCommand::from_key(key) {
                info!("SESSION | operator: {:?}", command);
                self.dispatch(command);
            }
        }
    }

    /// Every channel is `Stopped`, or its task has exited without getting
    /// there (panic, abort).
    pub fn all_stopped(&self) -> bool {
        self.channels.iter().enumerate().all(|(i, c)| {
            c.state() == ChannelState::Stopped
                || self.tasks.get(i).is_some_and(TaskHandle::is_finished)
        })
    }

    /// Poll keys and channel states until every channel has stopped, then
    /// join the tasks and report.
    pub fn run(mut self, console: &mut impl ConsolePort) -> SessionReport {
        loop {
            self.poll_input(console);
            if self.all_stopped() {
                break;
            }
            self.clock.sleep_ms(self.timing.monitor_poll_ms);
        }
        self.finish()
    }

    /// Join every task, end the session, and build the report.
    pub fn finish(mut self) -> SessionReport {
        let mut reports = heapless::Vec::new();
        let tasks = core::mem::take(&mut self.tasks);

        for (channel, task) in self.channels.iter().zip(tasks) {
            let name = task.name();
            let completed = match task.join() {
                Ok(_) => true,
                Err(e) => {
                    warn!("SESSION | task '{}' ended with error: {}", name, e);
                    channel.finish();
                    false
                }
            };
            let spec = channel.spec();
            let _ = reports.push(ChannelReport {
                label: spec.label.clone(),
                line: spec.line(),
                mode: spec.mode(),
                interval_ms: spec.interval_ms(),
                pulse_duration_ms: spec.pulse_duration_ms(),
                max_pulses: spec.max_pulses(),
                pulses_fired: channel.pulses_fired(),
                completed,
            });
        }

        self.control.end();

        let report = SessionReport {
            channels: reports,
            stop_requested: self.stop_requested,
            elapsed_ms: self.clock.now_ms().saturating_sub(self.started_at_ms),
        };
        info!(
            "SESSION | ended after {} ms, {} pulse(s) total",
            report.elapsed_ms,
            report.total_pulses()
        );
        report
    }
}

/// Render a report as one JSON line.
pub fn report_json(report: &SessionReport) -> serde_json::Result<String> {
    serde_json::to_string(report)
}
