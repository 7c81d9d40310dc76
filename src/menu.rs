//! Operator dialogue on the console UART.
//!
//! Runs on the main task between sessions, before any pulse task exists.
//! Every prompt blocks until the operator answers; a rejected value ends
//! the round with a [`ConfigError`] and the caller starts over.
//!
//! ```text
//!   ask_output_count ─▶ configure_channel × N ─▶ print_summary ─▶ wait_for_start
//! ```

use core::fmt::{self, Write as _};

use crate::app::ports::ConsolePort;
use crate::channel::{ChannelSpec, LineId, PulseMode};
use crate::config::{
    DURATION_MAX_MS, DURATION_MIN_MS, INTERVAL_MAX_MS, INTERVAL_MIN_MS, MAX_CHANNELS,
    MAX_PULSES_LIMIT, PPS_MAX,
};
use crate::error::ConfigError;
use crate::pins::OUTPUT_GPIOS;
use crate::validation::{pps_to_interval, validate_channel, validate_duration};

/// How long one blocking read waits before the key loop retries.
const KEY_WAIT_MS: u32 = 1000;

/// Longest number the operator can type.
const MAX_DIGITS: usize = 9;

const LABELS: [&str; MAX_CHANNELS] = ["Output 1", "Output 2"];

/// Console output is best effort; a dropped prompt must not abort the menu.
fn say(console: &mut impl ConsolePort, args: fmt::Arguments<'_>) {
    let _ = console.write_fmt(args);
}

/// Block until a byte satisfying `accept` arrives.  Other bytes are dropped.
pub fn read_key(console: &mut impl ConsolePort, accept: impl Fn(u8) -> bool) -> u8 {
    loop {
        if let Some(byte) = console.read_byte(KEY_WAIT_MS) {
            if accept(byte) {
                return byte;
            }
        }
    }
}

/// Ask how many outputs to drive.  Returns 1 or 2.
pub fn ask_output_count(console: &mut impl ConsolePort) -> usize {
    say(console, format_args!("=== PULSE GENERATOR ===\n"));
    say(console, format_args!("How many outputs?\n"));
    say(console, format_args!("1 - Output 1 only (GPIO{})\n", OUTPUT_GPIOS[0]));
    say(
        console,
        format_args!("2 - Both outputs (GPIO{} and GPIO{})\n", OUTPUT_GPIOS[0], OUTPUT_GPIOS[1]),
    );
    say(console, format_args!("Enter 1 or 2: "));

    let key = read_key(console, |b| b == b'1' || b == b'2');
    say(console, format_args!("{}\n", key as char));
    usize::from(key - b'0')
}

/// Read a decimal number of up to nine digits.
///
/// Digits are echoed and anything else is ignored.  CR or LF ends the
/// entry once at least one digit was typed; the ninth digit ends it
/// immediately.
pub fn read_number(
    console: &mut impl ConsolePort,
    prompt: &str,
    min: u32,
    max: u32,
) -> Result<u32, ConfigError> {
    say(console, format_args!("{} ({} to {}): ", prompt, min, max));

    let mut value: u32 = 0;
    let mut digits = 0usize;
    while digits < MAX_DIGITS {
        let byte = read_key(console, |b| b.is_ascii_digit() || b == b'\r' || b == b'\n');
        if byte.is_ascii_digit() {
            say(console, format_args!("{}", byte as char));
            // Nine decimal digits always fit in a u32.
            value = value * 10 + u32::from(byte - b'0');
            digits += 1;
        } else if digits > 0 {
            break;
        }
    }
    say(console, format_args!("\n"));

    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        say(console, format_args!("Out of range! Must be between {} and {}.\n", min, max));
        Err(ConfigError::ValueOutOfRange { value, min, max })
    }
}

/// Ask for the interval, either directly in ms or as a pulse rate.
fn read_interval(console: &mut impl ConsolePort) -> Result<u32, ConfigError> {
    say(console, format_args!("Timing entry:\n"));
    say(console, format_args!("I - interval between pulses (ms)\n"));
    say(console, format_args!("F - rate (pulses per second)\n"));
    say(console, format_args!("Enter I or F: "));

    let key = read_key(console, |b| matches!(b.to_ascii_uppercase(), b'I' | b'F'));
    say(console, format_args!("{}\n", key as char));

    if key.to_ascii_uppercase() == b'I' {
        return read_number(console, "Interval between pulses (ms)", INTERVAL_MIN_MS, INTERVAL_MAX_MS);
    }

    let pps = read_number(console, "Pulse rate (pulses/s)", 1, PPS_MAX)?;
    let interval = pps_to_interval(pps)?;
    say(console, format_args!("{} pulses/s -> interval {} ms\n", pps, interval));
    Ok(interval)
}

fn select_mode(console: &mut impl ConsolePort, interval_ms: u32) -> PulseMode {
    say(console, format_args!("Select mode:\n"));
    say(console, format_args!("D - Fixed (every {} ms)\n", interval_ms));
    say(console, format_args!("R - Random (1 to {} ms)\n", interval_ms));
    say(console, format_args!("Enter D or R: "));

    let key = read_key(console, |b| matches!(b.to_ascii_uppercase(), b'D' | b'R'));
    say(console, format_args!("{}\n", key as char));
    if key.to_ascii_uppercase() == b'D' {
        PulseMode::Fixed
    } else {
        PulseMode::Random
    }
}

/// Configure output `number` (1-based) driving `line`.
pub fn configure_channel(
    console: &mut impl ConsolePort,
    number: usize,
    line: LineId,
) -> Result<ChannelSpec, ConfigError> {
    let label = LABELS
        .get(number.wrapping_sub(1))
        .copied()
        .ok_or(ConfigError::TooManyChannels)?;
    say(console, format_args!("\n=== {} ({}) ===\n", label, line));

    let interval = read_interval(console).inspect_err(|_| {
        say(console, format_args!("Invalid interval for output {}!\n", number));
    })?;
    let duration = read_number(console, "Pulse duration (ms)", DURATION_MIN_MS, DURATION_MAX_MS)
        .inspect_err(|_| {
            say(console, format_args!("Invalid pulse duration for output {}!\n", number));
        })?;

    if let Err(e) = validate_duration(duration, interval) {
        say(console, format_args!("ERROR: {}!\n", e));
        say(
            console,
            format_args!(
                "For an interval of {} ms the pulse must be at most {} ms.\n",
                interval,
                interval.saturating_sub(1)
            ),
        );
        return Err(e);
    }

    let mode = select_mode(console, interval);
    let max_pulses = read_number(console, "Pulse budget (0 = unlimited)", 0, MAX_PULSES_LIMIT)?;

    validate_channel(line, label, interval, duration, mode, max_pulses)
}

/// Run the whole dialogue.  Any rejected value aborts the round.
pub fn configure_session(
    console: &mut impl ConsolePort,
) -> Result<heapless::Vec<ChannelSpec, MAX_CHANNELS>, ConfigError> {
    let count = ask_output_count(console);
    let mut specs = heapless::Vec::new();

    for (i, gpio) in OUTPUT_GPIOS.iter().copied().enumerate().take(count) {
        let number = i + 1;
        let spec = configure_channel(console, number, LineId(gpio)).inspect_err(|_| {
            say(console, format_args!("Configuration of output {} failed!\n", number));
        })?;
        specs.push(spec).map_err(|_| ConfigError::TooManyChannels)?;
    }
    Ok(specs)
}

/// Print one line per output.  A missing second output reads "not used".
pub fn print_summary(console: &mut impl ConsolePort, specs: &[ChannelSpec]) {
    say(console, format_args!("\n=== Configuration summary ===\n"));
    for (i, label) in LABELS.iter().enumerate() {
        let Some(spec) = specs.get(i) else {
            say(console, format_args!("{}: not used\n", label));
            continue;
        };
        say(
            console,
            format_args!(
                "{}: {}, interval={} ms ({} pulses/s), pulse={} ms, mode={}, ",
                spec.label(),
                spec.line(),
                spec.interval_ms(),
                spec.derived_pps(),
                spec.pulse_duration_ms(),
                spec.mode()
            ),
        );
        if spec.is_bounded() {
            say(console, format_args!("max={}\n", spec.max_pulses()));
        } else {
            say(console, format_args!("unlimited\n"));
        }
    }
}

/// Block until the operator presses `S`.
pub fn wait_for_start(console: &mut impl ConsolePort) {
    say(console, format_args!("\nPress 'S' to start ('P' pause/resume, 'X' stop)...\n"));
    read_key(console, |b| b.eq_ignore_ascii_case(&b'S'));
    say(console, format_args!("\n>>> Generating pulses...\n"));
}
