//! Unified error types for the pulse generator firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! session loop's error handling uniform.  All variants are `Copy` so they
//! can be handed back across task boundaries without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Operator-supplied configuration was rejected.
    Config(ConfigError),
    /// A pulse task was started without a validated channel config.
    NullConfig,
    /// The channel config already ran in an earlier task.
    ChannelReused,
    /// The OS refused to create a pulse task.
    Spawn,
    /// A pulse task panicked before reporting its result.
    TaskPanicked,
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::NullConfig => write!(f, "pulse task started without a channel config"),
            Self::ChannelReused => write!(f, "channel config was already used by another task"),
            Self::Spawn => write!(f, "pulse task could not be spawned"),
            Self::TaskPanicked => write!(f, "pulse task panicked"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Validation failures.  The operator is re-prompted; no channel is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Interval outside `[INTERVAL_MIN_MS, INTERVAL_MAX_MS]`.
    IntervalOutOfRange(u32),
    /// Pulse duration outside `[DURATION_MIN_MS, DURATION_MAX_MS]`.
    DurationOutOfRange(u32),
    /// Pulse duration must be strictly shorter than the interval.
    DurationNotLessThanInterval { duration_ms: u32, interval_ms: u32 },
    /// Pulses-per-second outside `[1, PPS_MAX]`.
    PpsOutOfRange(u32),
    /// A typed number fell outside the prompt's accepted range.
    ValueOutOfRange { value: u32, min: u32, max: u32 },
    /// More channels than output lines.
    TooManyChannels,
    /// Display label does not fit the fixed-capacity buffer.
    LabelTooLong,
    /// A timing parameter is zero or otherwise unusable.
    InvalidTiming(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntervalOutOfRange(v) => write!(f, "interval {v} ms out of range"),
            Self::DurationOutOfRange(v) => write!(f, "pulse duration {v} ms out of range"),
            Self::DurationNotLessThanInterval {
                duration_ms,
                interval_ms,
            } => write!(
                f,
                "pulse duration ({duration_ms} ms) must be less than the interval ({interval_ms} ms)"
            ),
            Self::PpsOutOfRange(v) => write!(f, "{v} pulses/s out of range"),
            Self::ValueOutOfRange { value, min, max } => {
                write!(f, "value {value} out of range ({min}..={max})")
            }
            Self::TooManyChannels => write!(f, "too many channels"),
            Self::LabelTooLong => write!(f, "label too long"),
            Self::InvalidTiming(msg) => write!(f, "invalid timing: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
