//! Hardware adapter — bridges real output pins to the domain port traits.
//!
//! [`HardwareIo`] is the only place that decides which concrete adapters
//! back a pulse task.  On non-espidf targets the underlying GPIO writes
//! are cfg-gated simulation stubs, so the same wiring runs on the host.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::adapters::log_sink::LogEventSink;
use crate::adapters::random::HardwareRng;
use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::{ChannelIo, IoFactory, Level, OutputPort};
use crate::channel::ChannelSpec;
use crate::drivers::output_line::OutputLine;

// ── Raw GPIO line ─────────────────────────────────────────────

/// [`OutputPort`] over a raw ESP-IDF GPIO configured by `hw_init`.
pub struct LineAdapter {
    line: OutputLine,
}

impl LineAdapter {
    pub fn new(line: OutputLine) -> Self {
        Self { line }
    }

    pub fn line(&self) -> &OutputLine {
        &self.line
    }
}

impl OutputPort for LineAdapter {
    fn set_level(&mut self, level: Level) {
        match level {
            Level::High => self.line.set_high(),
            Level::Low => self.line.set_low(),
        }
    }
}

// ── embedded-hal line ─────────────────────────────────────────

/// [`OutputPort`] over any `embedded-hal` output pin, e.g. an
/// `esp_idf_svc::hal::gpio::PinDriver` or a port-expander pin.
///
/// Write errors are logged and otherwise ignored: the port contract is
/// infallible and a pulse task has nothing useful to do with the error.
pub struct HalLine<P> {
    pin: P,
}

impl<P: OutputPin> HalLine<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: OutputPin> OutputPort for HalLine<P> {
    fn set_level(&mut self, level: Level) {
        let result = match level {
            Level::High => self.pin.set_high(),
            Level::Low => self.pin.set_low(),
        };
        if let Err(e) = result {
            warn!("HalLine: write {:?} failed: {:?}", level, e);
        }
    }
}

// ── Per-channel wiring ────────────────────────────────────────

/// Production [`IoFactory`]: raw GPIO line, ESP32 timer, hardware RNG,
/// serial log sink.
#[derive(Default)]
pub struct HardwareIo {
    clock: Esp32TimeAdapter,
}

impl HardwareIo {
    pub fn new(clock: Esp32TimeAdapter) -> Self {
        Self { clock }
    }
}

impl IoFactory for HardwareIo {
    type Line = LineAdapter;
    type Clock = Esp32TimeAdapter;
    type Rng = HardwareRng;
    type Sink = LogEventSink;

    fn io_for(&mut self, spec: &ChannelSpec) -> ChannelIo<LineAdapter, Esp32TimeAdapter, HardwareRng, LogEventSink> {
        ChannelIo {
            line: LineAdapter::new(OutputLine::new(spec.line().gpio())),
            clock: self.clock,
            rng: HardwareRng::new(),
            sink: LogEventSink::new(),
        }
    }
}
