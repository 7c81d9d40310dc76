//! Pulse task behaviour against a virtual clock: exact edge timing, pulse
//! budgets, stop and pause handling, random-interval draws.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pulsegen::adapters::hardware::HalLine;
use pulsegen::app::events::StopReason;
use pulsegen::app::ports::{ChannelIo, Clock, Level};
use pulsegen::channel::{ChannelConfig, ChannelSpec, ChannelState, LineId, PulseMode};
use pulsegen::config::TimingConfig;
use pulsegen::control::ControlState;
use pulsegen::error::Error;
use pulsegen::pulse::create_channel;
use pulsegen::validation::validate_channel;

use crate::mock_hw::{
    EventLog, LineLog, MockLine, RecordingSink, Recorded, ScriptedRng, SimClock, falling_edges,
    fired,
};

fn spec(interval_ms: u32, duration_ms: u32, mode: PulseMode, max_pulses: u32) -> ChannelSpec {
    validate_channel(LineId(4), "Output 1", interval_ms, duration_ms, mode, max_pulses).unwrap()
}

fn running_control() -> Arc<ControlState> {
    let control = Arc::new(ControlState::new());
    control.start();
    control
}

struct Rig {
    io: ChannelIo<MockLine, SimClock, ScriptedRng, RecordingSink>,
    clock: SimClock,
    line: LineLog,
    events: EventLog,
}

fn rig(draws: &[u32]) -> Rig {
    let clock = SimClock::new();
    let (line, line_log) = MockLine::new(clock.clone());
    let (sink, events) = RecordingSink::new();
    Rig {
        io: ChannelIo {
            line,
            clock: clock.clone(),
            rng: ScriptedRng::new(draws),
            sink,
        },
        clock,
        line: line_log,
        events,
    }
}

fn last_event(events: &EventLog) -> Recorded {
    events.lock().unwrap().last().cloned().unwrap()
}

// ── Fixed mode ────────────────────────────────────────────────

#[test]
fn fixed_budget_fires_exactly_on_schedule() {
    let channel = Arc::new(ChannelConfig::new(spec(500, 100, PulseMode::Fixed, 3)));
    let r = rig(&[]);

    let task = create_channel(
        "test-1\0",
        Some(Arc::clone(&channel)),
        running_control(),
        TimingConfig::default(),
        r.io,
    )
    .unwrap();
    assert_eq!(task.join(), Ok(3));

    use Level::{High, Low};
    let expected = vec![
        (0, High),
        (500, Low),
        (600, High),
        (1000, Low),
        (1100, High),
        (1500, Low),
        (1600, High),
        // end-of-run blinks
        (1600, Low),
        (1700, High),
        (1800, Low),
        (1900, High),
        (2000, Low),
        (2100, High),
    ];
    assert_eq!(*r.line.lock().unwrap(), expected);

    assert_eq!(channel.pulses_fired(), 3);
    assert_eq!(channel.state(), ChannelState::Stopped);
    assert_eq!(
        fired(&r.events),
        vec![(500, 500), (500, 1000), (500, 1500)]
    );
    assert_eq!(
        last_event(&r.events),
        Recorded::Stopped {
            pulses: 3,
            reason: StopReason::BudgetReached
        }
    );
}

#[test]
fn started_event_carries_label_and_mode() {
    let channel = Arc::new(ChannelConfig::new(spec(50, 10, PulseMode::Fixed, 1)));
    let r = rig(&[]);
    let task = create_channel("test-1\0", Some(channel), running_control(), TimingConfig::default(), r.io)
        .unwrap();
    task.join().unwrap();

    assert_eq!(
        r.events.lock().unwrap()[0],
        Recorded::Started {
            label: "Output 1".into(),
            mode: PulseMode::Fixed
        }
    );
}

#[test]
fn unbounded_channel_runs_until_stop() {
    let control = running_control();
    let channel = Arc::new(ChannelConfig::new(spec(10, 2, PulseMode::Fixed, 0)));
    let mut r = rig(&[]);

    let stopper = Arc::clone(&control);
    r.io.sink = r.io.sink.on_fired(7, move || stopper.request_stop());

    let task = create_channel("test-1\0", Some(Arc::clone(&channel)), control, TimingConfig::default(), r.io)
        .unwrap();
    assert_eq!(task.join(), Ok(7));

    assert_eq!(channel.state(), ChannelState::Stopped);
    // Seven pulses plus three end-of-run blinks.
    assert_eq!(falling_edges(&r.line).len(), 10);
    assert_eq!(
        last_event(&r.events),
        Recorded::Stopped {
            pulses: 7,
            reason: StopReason::StopRequested
        }
    );
}

#[test]
fn nothing_fires_when_session_not_running() {
    let control = Arc::new(ControlState::new());
    let channel = Arc::new(ChannelConfig::new(spec(10, 2, PulseMode::Fixed, 5)));
    let r = rig(&[]);

    let task = create_channel("test-1\0", Some(Arc::clone(&channel)), control, TimingConfig::default(), r.io)
        .unwrap();
    assert_eq!(task.join(), Ok(0));
    assert!(fired(&r.events).is_empty());
    assert_eq!(channel.state(), ChannelState::Stopped);
}

#[test]
fn stop_mid_interval_is_seen_within_one_tick() {
    let control = running_control();
    let channel = Arc::new(ChannelConfig::new(spec(1000, 10, PulseMode::Fixed, 0)));
    let r = rig(&[]);

    let stopper = Arc::clone(&control);
    r.clock.alarm(300, move || stopper.request_stop());

    let task = create_channel("test-1\0", Some(Arc::clone(&channel)), control, TimingConfig::default(), r.io)
        .unwrap();
    assert_eq!(task.join(), Ok(0));

    assert!(fired(&r.events).is_empty());
    assert_eq!(channel.state(), ChannelState::Stopped);
    // Only the end-of-run blinks, starting on the tick the stop landed.
    assert_eq!(falling_edges(&r.line), vec![300, 500, 700]);
    assert_eq!(
        last_event(&r.events),
        Recorded::Stopped {
            pulses: 0,
            reason: StopReason::StopRequested
        }
    );
}

// ── Pause ─────────────────────────────────────────────────────

#[test]
fn pause_mid_interval_stretches_the_wait_by_the_paused_time() {
    let control = running_control();
    let channel = Arc::new(ChannelConfig::new(spec(1000, 10, PulseMode::Fixed, 1)));
    let r = rig(&[]);

    let (pauser, paused) = (Arc::clone(&control), Arc::clone(&channel));
    r.clock.alarm(300, move || {
        pauser.toggle_pause(&[Arc::clone(&paused)]);
    });
    let (resumer, resumed) = (Arc::clone(&control), Arc::clone(&channel));
    r.clock.alarm(800, move || {
        resumer.toggle_pause(&[Arc::clone(&resumed)]);
    });

    let task = create_channel("test-1\0", Some(Arc::clone(&channel)), control, TimingConfig::default(), r.io)
        .unwrap();
    assert_eq!(task.join(), Ok(1));

    // Paused from 300 to 800: the single pulse lands 500 ms late.
    assert_eq!(fired(&r.events), vec![(1000, 1500)]);
}

#[test]
fn pause_holds_count_and_resume_continues_from_it() {
    let control = running_control();
    let channel = Arc::new(ChannelConfig::new(spec(100, 10, PulseMode::Fixed, 4)));
    let mut r = rig(&[]);

    let pauser = Arc::clone(&control);
    let paused_channel = Arc::clone(&channel);
    r.io.sink = r
        .io
        .sink
        .on_fired(2, move || {
            pauser.toggle_pause(&[Arc::clone(&paused_channel)]);
        });

    let task = create_channel(
        "test-1\0",
        Some(Arc::clone(&channel)),
        Arc::clone(&control),
        TimingConfig::default(),
        r.io,
    )
    .unwrap();

    while channel.state() != ChannelState::Paused {
        std::thread::yield_now();
    }
    let paused_at = r.clock.now_ms();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(channel.pulses_fired(), 2);
    assert_eq!(channel.state(), ChannelState::Paused);
    assert!(r.clock.now_ms() >= paused_at);

    assert!(!control.toggle_pause(&[Arc::clone(&channel)]));
    assert_eq!(task.join(), Ok(4));

    let times: Vec<u64> = fired(&r.events).iter().map(|(_, at)| *at).collect();
    assert_eq!(times.len(), 4);
    assert_eq!(times[0], 100);
    assert_eq!(times[1], 200);
    // The gap across the pause is the interval plus whole pause polls.
    let gap = times[2] - times[1];
    assert!(gap >= 100);
    assert_eq!(gap % 100, 0);
    assert_eq!(times[3] - times[2], 100);
}

// ── Random mode ───────────────────────────────────────────────

#[test]
fn random_mode_draws_once_per_pulse_and_floors_short_draws() {
    let channel = Arc::new(ChannelConfig::new(spec(500, 100, PulseMode::Random, 3)));
    let r = rig(&[300, 50, 250]);
    let maxes = Arc::clone(&r.io.rng.maxes);

    let task = create_channel("test-1\0", Some(channel), running_control(), TimingConfig::default(), r.io)
        .unwrap();
    assert_eq!(task.join(), Ok(3));

    assert_eq!(fired(&r.events), vec![(300, 300), (101, 401), (250, 651)]);
    assert_eq!(*maxes.lock().unwrap(), vec![500, 500, 500]);
}

#[test]
fn mode_is_honoured_per_channel() {
    let control = running_control();
    let fixed = Arc::new(ChannelConfig::new(spec(200, 50, PulseMode::Fixed, 3)));
    let random = Arc::new(ChannelConfig::new(spec(200, 50, PulseMode::Random, 3)));
    let rf = rig(&[]);
    let rr = rig(&[120, 30, 200]);

    let a = create_channel("test-1\0", Some(fixed), Arc::clone(&control), TimingConfig::default(), rf.io)
        .unwrap();
    let b = create_channel("test-2\0", Some(random), control, TimingConfig::default(), rr.io).unwrap();
    assert_eq!(a.join(), Ok(3));
    assert_eq!(b.join(), Ok(3));

    let intervals = |log: &EventLog| fired(log).iter().map(|(i, _)| *i).collect::<Vec<_>>();
    assert_eq!(intervals(&rf.events), vec![200, 200, 200]);
    assert_eq!(intervals(&rr.events), vec![120, 51, 200]);
}

// ── Two channels, one stop ────────────────────────────────────

#[test]
fn stop_ends_bounded_and_unbounded_channels() {
    let control = running_control();
    let a = Arc::new(ChannelConfig::new(spec(100, 10, PulseMode::Fixed, 5)));
    let b = Arc::new(ChannelConfig::new(spec(100, 10, PulseMode::Fixed, 0)));
    let mut ra = rig(&[]);
    let rb = rig(&[]);

    let stopper = Arc::clone(&control);
    ra.io.sink = ra.io.sink.on_fired(3, move || stopper.request_stop());

    let ta = create_channel("test-1\0", Some(Arc::clone(&a)), Arc::clone(&control), TimingConfig::default(), ra.io)
        .unwrap();
    let tb = create_channel("test-2\0", Some(Arc::clone(&b)), control, TimingConfig::default(), rb.io)
        .unwrap();

    assert_eq!(ta.join(), Ok(3));
    assert!(tb.join().is_ok());

    assert_eq!(a.pulses_fired(), 3);
    assert_eq!(a.state(), ChannelState::Stopped);
    assert_eq!(b.state(), ChannelState::Stopped);
    assert_eq!(
        last_event(&rb.events),
        Recorded::Stopped {
            pulses: b.pulses_fired(),
            reason: StopReason::StopRequested
        }
    );
}

// ── Null config ───────────────────────────────────────────────

#[test]
fn null_config_fails_alone() {
    let control = running_control();
    let sibling = Arc::new(ChannelConfig::new(spec(100, 10, PulseMode::Fixed, 2)));
    let rn = rig(&[]);
    let rs = rig(&[]);

    let null_task = create_channel("pulse-1\0", None, Arc::clone(&control), TimingConfig::default(), rn.io)
        .unwrap();
    let sibling_task =
        create_channel("pulse-2\0", Some(Arc::clone(&sibling)), control, TimingConfig::default(), rs.io)
            .unwrap();

    assert_eq!(null_task.name(), "pulse-1");
    assert_eq!(null_task.join(), Err(Error::NullConfig));
    assert_eq!(
        *rn.events.lock().unwrap(),
        vec![Recorded::Aborted {
            task: "pulse-1".into(),
            error: Error::NullConfig
        }]
    );
    assert!(rn.line.lock().unwrap().is_empty());

    assert_eq!(sibling_task.join(), Ok(2));
    assert_eq!(sibling.pulses_fired(), 2);
}

#[test]
fn spent_config_is_not_restarted() {
    let control = running_control();
    let channel = Arc::new(ChannelConfig::new(spec(10, 2, PulseMode::Fixed, 1)));

    let first = rig(&[]);
    let task = create_channel(
        "pulse-1\0",
        Some(Arc::clone(&channel)),
        Arc::clone(&control),
        TimingConfig::default(),
        first.io,
    )
    .unwrap();
    assert_eq!(task.join(), Ok(1));

    let again = rig(&[]);
    let task = create_channel("pulse-1\0", Some(Arc::clone(&channel)), control, TimingConfig::default(), again.io)
        .unwrap();
    assert_eq!(task.join(), Err(Error::ChannelReused));

    assert_eq!(channel.pulses_fired(), 1);
    assert_eq!(channel.state(), ChannelState::Stopped);
    assert!(again.line.lock().unwrap().is_empty());
    assert_eq!(
        *again.events.lock().unwrap(),
        vec![Recorded::Aborted {
            task: "pulse-1".into(),
            error: Error::ChannelReused
        }]
    );
}

// ── embedded-hal output ───────────────────────────────────────

#[derive(Default, Clone)]
struct RecordingPin {
    writes: Arc<Mutex<Vec<bool>>>,
}

impl embedded_hal::digital::ErrorType for RecordingPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.writes.lock().unwrap().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.writes.lock().unwrap().push(true);
        Ok(())
    }
}

#[derive(Debug)]
struct PinFault;

impl embedded_hal::digital::Error for PinFault {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

struct BrokenPin;

impl embedded_hal::digital::ErrorType for BrokenPin {
    type Error = PinFault;
}

impl embedded_hal::digital::OutputPin for BrokenPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        Err(PinFault)
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        Err(PinFault)
    }
}

#[test]
fn hal_pin_carries_pulses_and_blinks() {
    let pin = RecordingPin::default();
    let writes = Arc::clone(&pin.writes);
    let clock = SimClock::new();
    let (sink, _events) = RecordingSink::new();
    let io = ChannelIo {
        line: HalLine::new(pin),
        clock,
        rng: ScriptedRng::unused(),
        sink,
    };
    let channel = Arc::new(ChannelConfig::new(spec(10, 2, PulseMode::Fixed, 2)));

    let task = create_channel("test-1\0", Some(channel), running_control(), TimingConfig::default(), io)
        .unwrap();
    assert_eq!(task.join(), Ok(2));

    let writes = writes.lock().unwrap();
    // Idle, two pulses, three blinks.
    assert_eq!(writes.len(), 1 + 2 * 2 + 3 * 2);
    assert!(writes[0]);
    assert_eq!(writes.iter().filter(|high| !**high).count(), 5);
    assert!(*writes.last().unwrap());
}

#[test]
fn hal_write_errors_do_not_stop_the_channel() {
    let (sink, events) = RecordingSink::new();
    let io = ChannelIo {
        line: HalLine::new(BrokenPin),
        clock: SimClock::new(),
        rng: ScriptedRng::unused(),
        sink,
    };
    let channel = Arc::new(ChannelConfig::new(spec(10, 2, PulseMode::Fixed, 2)));

    let task = create_channel("test-1\0", Some(channel), running_control(), TimingConfig::default(), io)
        .unwrap();
    assert_eq!(task.join(), Ok(2));
    assert_eq!(fired(&events).len(), 2);
}
