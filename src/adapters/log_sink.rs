//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing pulse-task events to the ESP-IDF
//! logger (which goes to UART / USB-CDC in production).

use log::{error, info};

use crate::app::events::{PulseEvent, StopReason};
use crate::app::ports::EventSink;

/// Adapter that logs every [`PulseEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &PulseEvent<'_>) {
        match event {
            PulseEvent::Started {
                label,
                mode,
                interval_ms,
                pulse_duration_ms,
                max_pulses,
            } => {
                if *max_pulses == 0 {
                    info!(
                        "PULSE | {} | start | mode={} interval={}ms pulse={}ms | unlimited",
                        label, mode, interval_ms, pulse_duration_ms
                    );
                } else {
                    info!(
                        "PULSE | {} | start | mode={} interval={}ms pulse={}ms | max={}",
                        label, mode, interval_ms, pulse_duration_ms, max_pulses
                    );
                }
            }
            PulseEvent::Fired {
                label,
                index,
                pulse_duration_ms,
                interval_ms,
                at_ms,
            } => {
                info!(
                    "PULSE | {} | #{} | {}ms low | interval={}ms | t={}ms",
                    label, index, pulse_duration_ms, interval_ms, at_ms
                );
            }
            PulseEvent::Stopped {
                label,
                pulses,
                reason,
            } => {
                let why = match reason {
                    StopReason::BudgetReached => "budget reached",
                    StopReason::StopRequested => "stop requested",
                };
                info!("PULSE | {} | stopped after {} pulse(s) ({})", label, pulses, why);
            }
            PulseEvent::Aborted { task, error: e } => {
                error!("PULSE | {} | aborted: {}", task, e);
            }
        }
    }
}
